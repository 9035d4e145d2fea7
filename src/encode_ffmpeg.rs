use std::{
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::foundation::error::{FramemarkError, FramemarkResult};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    /// Output frame rate as an exact rational, matching the source.
    pub fps_num: u32,
    pub fps_den: u32,
    /// Target bitrate in kbit/s; `None` keeps the encoder default.
    pub bitrate_kbps: Option<u32>,
    pub out_path: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> FramemarkResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FramemarkError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // With the default settings we target yuv420p output for maximum compatibility.
            return Err(FramemarkError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps_num == 0 || self.fps_den == 0 {
            return Err(FramemarkError::validation("encode fps must be non-zero"));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// H.264 MP4 encoder fed raw BGR24 frames over stdin.
///
/// Uses the system `ffmpeg` binary rather than `ffmpeg-next` to avoid native
/// FFmpeg dev header/lib requirements. The audio track is always dropped.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> FramemarkResult<Self> {
        cfg.validate()?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "bgr24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps_num, cfg.fps_den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        if let Some(kbps) = cfg.bitrate_kbps {
            cmd.args(["-b:v", &format!("{kbps}k")]);
        }
        cmd.arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            FramemarkError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FramemarkError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    fn frame_len(&self) -> usize {
        self.cfg.width as usize * self.cfg.height as usize * 3
    }

    pub fn encode_frame(&mut self, bgr24: &[u8]) -> FramemarkResult<()> {
        if bgr24.len() != self.frame_len() {
            return Err(FramemarkError::validation(format!(
                "frame size mismatch: got {} bytes, expected {} ({}x{} bgr24)",
                bgr24.len(),
                self.frame_len(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FramemarkError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(bgr24).map_err(|e| {
            FramemarkError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    /// Close stdin, wait for the container to be fully written, and surface
    /// any encoder failure.
    pub fn finish(mut self) -> FramemarkResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            FramemarkError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FramemarkError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

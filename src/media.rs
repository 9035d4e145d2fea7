use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Probed metadata for one video source.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    /// Frame count declared by the container, 0 when absent.
    pub declared_frames: u64,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Total frame count: the container's declared count when present and
    /// nonzero, else derived from fps and duration.
    pub fn total_frames(&self) -> u64 {
        derive_total_frames(self.declared_frames, self.source_fps(), self.duration_sec)
    }
}

pub fn derive_total_frames(declared: u64, fps: f64, duration_sec: f64) -> u64 {
    if declared > 0 {
        declared
    } else {
        (fps * duration_sec).round() as u64
    }
}

pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn probe_video(source_path: &Path) -> FramemarkResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| FramemarkError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(FramemarkError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| FramemarkError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FramemarkError::decode("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| FramemarkError::decode("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| FramemarkError::decode("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| FramemarkError::decode("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let declared_frames = video_stream
        .nb_frames
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        declared_frames,
    })
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

/// Streams raw BGR24 frames out of a spawned `ffmpeg` decode process. Only
/// one frame is in memory at a time; the child is reaped on every path.
pub struct RawFrameReader {
    child: Child,
    stdout: Option<ChildStdout>,
    frame_len: usize,
}

impl RawFrameReader {
    pub fn spawn(source: &VideoSourceInfo) -> FramemarkResult<Self> {
        let frame_len = source.width as usize * source.height as usize * 3;
        if frame_len == 0 {
            return Err(FramemarkError::decode(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error"])
            .arg("-i")
            .arg(&source.source_path)
            .args(["-f", "rawvideo", "-pix_fmt", "bgr24", "-an", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                FramemarkError::decode(format!("failed to run ffmpeg for video decode: {e}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FramemarkError::decode("failed to open ffmpeg stdout (unexpected)"))?;

        Ok(Self {
            child,
            stdout: Some(stdout),
            frame_len,
        })
    }

    /// Read the next frame, or `None` at end of stream. A trailing partial
    /// frame is an error.
    pub fn next_frame(&mut self) -> FramemarkResult<Option<Vec<u8>>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;
        while filled < buf.len() {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(FramemarkError::decode(format!("read decoded frame: {e}")));
                }
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(FramemarkError::decode(format!(
                "decoded stream ended mid-frame: got {filled} bytes, expected {}",
                buf.len()
            )));
        }
        Ok(Some(buf))
    }

    /// Wait for the decoder to exit and surface any codec error.
    pub fn finish(mut self) -> FramemarkResult<()> {
        drop(self.stdout.take());

        let mut stderr_buf = String::new();
        if let Some(mut stderr) = self.child.stderr.take() {
            let _ = stderr.read_to_string(&mut stderr_buf);
        }

        let status = self
            .child
            .wait()
            .map_err(|e| FramemarkError::decode(format!("failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(FramemarkError::decode(format!(
                "ffmpeg video decode exited with status {status}: {}",
                stderr_buf.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for RawFrameReader {
    fn drop(&mut self) {
        // No-ops after finish(); kills an abandoned decoder otherwise.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

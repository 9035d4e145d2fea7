use std::io::Write as _;

use image::RgbImage;

use crate::{
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path},
    foundation::error::{FramemarkError, FramemarkResult},
    media::{self, RawFrameReader},
    model::Model,
    progress::FrameCounter,
};

/// Options for [`process_video`].
#[derive(Clone, Debug, Default)]
pub struct VideoOptions {
    /// Target video bitrate in kilobits per second. `None` keeps the
    /// encoder's default rate control.
    pub bitrate_kbps: Option<u32>,
}

/// Re-encode one uploaded video with every frame passed through `model`.
///
/// The output keeps the source frame rate and frame count; the audio track
/// is dropped. Decoded frames arrive as BGR24 and are converted to the
/// crate-native RGB order before `execute`, then back for the encoder. The
/// progress callback observes `min(done / total, 1.0)` after every frame.
///
/// The encoded MP4 is fully materialized before returning. Input and output
/// live in request-scoped temp files removed on every exit path, including
/// failure.
pub fn process_video(
    model: &Model,
    upload: &[u8],
    opts: &VideoOptions,
    progress: &mut dyn FnMut(f64),
) -> FramemarkResult<Vec<u8>> {
    if upload.is_empty() {
        return Err(FramemarkError::MissingUpload);
    }
    if !is_ffmpeg_on_path() {
        return Err(FramemarkError::encode(
            "ffmpeg is required for video processing, but was not found on PATH",
        ));
    }

    let mut input = tempfile::NamedTempFile::new()
        .map_err(|e| FramemarkError::decode(format!("create temp input file: {e}")))?;
    input
        .write_all(upload)
        .and_then(|()| input.flush())
        .map_err(|e| FramemarkError::decode(format!("write temp input file: {e}")))?;

    let info = media::probe_video(input.path())?;
    let total_frames = info.total_frames();
    tracing::info!(
        width = info.width,
        height = info.height,
        fps = %format!("{}/{}", info.fps_num, info.fps_den),
        total_frames,
        bitrate_kbps = opts.bitrate_kbps,
        "processing video"
    );

    let output = tempfile::Builder::new()
        .suffix(".mp4")
        .tempfile()
        .map_err(|e| FramemarkError::encode(format!("create temp output file: {e}")))?;

    let cfg = EncodeConfig {
        width: info.width,
        height: info.height,
        fps_num: info.fps_num,
        fps_den: info.fps_den,
        bitrate_kbps: opts.bitrate_kbps,
        out_path: output.path().to_path_buf(),
    };
    cfg.validate()?;

    let mut reader = RawFrameReader::spawn(&info)?;
    let mut encoder = FfmpegEncoder::new(cfg)?;
    let mut counter = FrameCounter::new(total_frames);

    while let Some(mut frame) = reader.next_frame()? {
        swap_channels(&mut frame);
        let rgb = RgbImage::from_raw(info.width, info.height, frame).ok_or_else(|| {
            FramemarkError::decode("decoded frame does not match probed dimensions")
        })?;

        let processed = model.execute(&rgb);

        let mut bgr = processed.into_raw();
        swap_channels(&mut bgr);
        encoder.encode_frame(&bgr)?;

        progress(counter.advance());
    }

    reader.finish()?;
    encoder.finish()?;

    if counter.done() == 0 {
        return Err(FramemarkError::decode("video stream contained no frames"));
    }
    tracing::info!(frames = counter.done(), "video processed");

    let bytes = std::fs::read(output.path())
        .map_err(|e| FramemarkError::encode(format!("read encoded output: {e}")))?;
    Ok(bytes)
}

/// Swap channels 0 and 2 in place (RGB <-> BGR). Purely a byte-layout
/// change, its own inverse.
fn swap_channels(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}

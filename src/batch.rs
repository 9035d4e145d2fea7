use std::io::Cursor;

use image::ImageFormat;

use crate::{
    foundation::error::{FramemarkError, FramemarkResult},
    model::Model,
    progress::FrameCounter,
};

/// One uploaded image: original filename plus raw bytes. The name travels
/// unmodified into the output archive entry.
#[derive(Clone, Debug)]
pub struct NamedUpload {
    pub name: String,
    pub data: Vec<u8>,
}

impl NamedUpload {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Output format follows the uploaded filename's extension; unknown or
/// missing extensions fall back to PNG.
fn format_for_name(name: &str) -> ImageFormat {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Png)
}

/// Apply `model` to each upload in order: decode, transform, re-encode.
///
/// Returns `(name, encoded bytes)` pairs in upload order, names preserved
/// verbatim. The progress callback observes `(index + 1) / total` after each
/// image. A decode failure anywhere aborts the whole request; there is no
/// per-item fault isolation and no partial result.
pub fn process_images(
    model: &Model,
    uploads: &[NamedUpload],
    progress: &mut dyn FnMut(f64),
) -> FramemarkResult<Vec<(String, Vec<u8>)>> {
    if uploads.is_empty() {
        return Err(FramemarkError::MissingUpload);
    }

    tracing::info!(count = uploads.len(), "processing image batch");

    let mut counter = FrameCounter::new(uploads.len() as u64);
    let mut out = Vec::with_capacity(uploads.len());

    for upload in uploads {
        tracing::debug!(name = %upload.name, "processing image");

        let decoded = image::load_from_memory(&upload.data)
            .map_err(|e| FramemarkError::decode(format!("decode '{}': {e}", upload.name)))?
            .to_rgb8();
        let processed = model.execute(&decoded);

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(processed)
            .write_to(&mut Cursor::new(&mut buf), format_for_name(&upload.name))
            .map_err(|e| FramemarkError::encode(format!("encode '{}': {e}", upload.name)))?;

        out.push((upload.name.clone(), buf));
        progress(counter.advance());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelKind, ModelParams};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 40]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn model_a() -> Model {
        Model::new(ModelKind::A, ModelParams::default()).unwrap()
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = process_images(&model_a(), &[], &mut |_| {}).unwrap_err();
        assert!(matches!(err, FramemarkError::MissingUpload));
    }

    #[test]
    fn order_names_and_progress() {
        let uploads = vec![
            NamedUpload::new("b.png", png_bytes(16, 16)),
            NamedUpload::new("a.png", png_bytes(16, 16)),
        ];

        let mut fractions = Vec::new();
        let processed = process_images(&model_a(), &uploads, &mut |f| fractions.push(f)).unwrap();

        let names: Vec<&str> = processed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b.png", "a.png"]);
        assert_eq!(fractions, vec![0.5, 1.0]);
    }

    #[test]
    fn decode_failure_aborts_the_request() {
        let uploads = vec![
            NamedUpload::new("ok.png", png_bytes(8, 8)),
            NamedUpload::new("broken.png", vec![0, 1, 2, 3]),
            NamedUpload::new("never.png", png_bytes(8, 8)),
        ];

        let mut calls = 0usize;
        let err = process_images(&model_a(), &uploads, &mut |_| calls += 1).unwrap_err();
        assert!(matches!(err, FramemarkError::Decode(msg) if msg.contains("broken.png")));
        // The first item completed before the failure; nothing after it ran.
        assert_eq!(calls, 1);
    }

    #[test]
    fn output_stays_decodable_and_same_size() {
        let uploads = vec![NamedUpload::new("img.jpg", png_bytes(32, 24))];
        let processed = process_images(&model_a(), &uploads, &mut |_| {}).unwrap();

        use image::GenericImageView;
        let round = image::load_from_memory(&processed[0].1).unwrap();
        assert_eq!(round.dimensions(), (32, 24));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(format_for_name("x.jpg"), ImageFormat::Jpeg);
        assert_eq!(format_for_name("x.jpeg"), ImageFormat::Jpeg);
        assert_eq!(format_for_name("x.png"), ImageFormat::Png);
        assert_eq!(format_for_name("noext"), ImageFormat::Png);
    }
}

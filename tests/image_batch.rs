use std::io::Cursor;

use framemark::{
    FramemarkError, Model, ModelKind, ModelParams, NamedUpload, process_images, zip_archive,
};
use image::{Rgb, RgbImage};

fn png_fixture(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn batch_to_archive_preserves_order_and_names() {
    let model = Model::new(ModelKind::A, ModelParams::default()).unwrap();
    let uploads = vec![
        NamedUpload::new("b.png", png_fixture(16, 16, [9, 9, 9])),
        NamedUpload::new("a.png", png_fixture(16, 16, [9, 9, 9])),
    ];

    let mut fractions = Vec::new();
    let processed = process_images(&model, &uploads, &mut |f| fractions.push(f)).unwrap();
    assert_eq!(fractions, vec![0.5, 1.0]);

    let archive = zip_archive(&processed).unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 2);
    assert_eq!(zip.by_index(0).unwrap().name(), "b.png");
    assert_eq!(zip.by_index(1).unwrap().name(), "a.png");
}

#[test]
fn model_a_scenario_100x100() {
    // 100x100 input, Model A, color (10,20,30). The outline
    // covers (25,25)-(75,75) with centered 5-px thickness; everything else
    // is untouched.
    let model = Model::new(
        ModelKind::A,
        ModelParams {
            color: Some([10, 20, 30]),
            ..ModelParams::default()
        },
    )
    .unwrap();

    let background = [200u8, 200, 200];
    let uploads = vec![NamedUpload::new(
        "scene.png",
        png_fixture(100, 100, background),
    )];
    let processed = process_images(&model, &uploads, &mut |_| {}).unwrap();

    let out = image::load_from_memory(&processed[0].1).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (100, 100));

    // Outline corner and band.
    assert_eq!(out.get_pixel(25, 25), &Rgb([10, 20, 30]));
    for x in 23..=27 {
        assert_eq!(out.get_pixel(x, 50), &Rgb([10, 20, 30]));
    }
    // Just inside and outside the band, and far corners: unchanged.
    assert_eq!(out.get_pixel(28, 50), &Rgb(background));
    assert_eq!(out.get_pixel(22, 50), &Rgb(background));
    assert_eq!(out.get_pixel(0, 0), &Rgb(background));
    assert_eq!(out.get_pixel(99, 99), &Rgb(background));
    assert_eq!(out.get_pixel(50, 50), &Rgb(background));
}

#[test]
fn unknown_selection_fails_before_any_decode() {
    let err = Model::from_selection("Model Z", ModelParams::default()).unwrap_err();
    assert!(matches!(err, FramemarkError::InvalidSelection(_)));
}

#[test]
fn corners_truncate_rather_than_round() {
    // 37x23 with Model B: floor(37*0.9) = 33 (rounding would give 33.3 -> 33
    // too, so also check the left corner where floor(37*0.1) = 3 but the
    // exact product is 3.7).
    let model = Model::new(ModelKind::B, ModelParams::default()).unwrap();
    let out = model.execute(&RgbImage::from_pixel(37, 23, Rgb([0, 0, 0])));

    assert_eq!(out.get_pixel(3, 2), &Rgb([255, 0, 0]));
    // A rounded corner would sit at x=4; the pixel two columns inside the
    // 5-px band's inner edge must be untouched.
    assert_eq!(out.get_pixel(7, 11), &Rgb([0, 0, 0]));
}

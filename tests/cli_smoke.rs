use std::{io::Cursor, process::Command};

#[test]
fn cli_images_writes_zip() {
    let dir = tempfile::tempdir().unwrap();

    let input = dir.path().join("frame.png");
    let img = image::RgbImage::from_pixel(32, 32, image::Rgb([128, 128, 128]));
    img.save(&input).unwrap();

    let out = dir.path().join("out.zip");
    let status = Command::new(env!("CARGO_BIN_EXE_framemark"))
        .arg("images")
        .args(["--model", "Model C", "--color", "1,2,3"])
        .arg("--out")
        .arg(&out)
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    let bytes = std::fs::read(&out).unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(zip.len(), 1);
    assert_eq!(zip.by_index(0).unwrap().name(), "frame.png");
}

#[test]
fn cli_rejects_unknown_model() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.png");
    image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]))
        .save(&input)
        .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_framemark"))
        .arg("images")
        .args(["--model", "Model Z"])
        .arg("--out")
        .arg(dir.path().join("out.zip"))
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Model Z"));
}

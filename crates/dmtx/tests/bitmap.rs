use dmtx::{bitmap, DecodeRequest, Error, Payload};
use tempfile::tempdir;

#[test]
fn png_file_round_trip_decodes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tag.png");

    let image = dmtx::generate_tag(&Payload::from("SN-000123")).unwrap();
    bitmap::save(&image, &path).unwrap();

    let loaded = bitmap::load(&path).unwrap();
    assert_eq!(loaded, image);

    let tags = dmtx::decode(&loaded, 1, 0).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].payload(), &Payload::from("SN-000123"));
}

#[test]
fn bmp_bytes_load_from_memory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tag.bmp");

    let image = dmtx::generate_tag(&Payload::Numeric(4711)).unwrap();
    bitmap::save(&image, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let loaded = bitmap::load_from_memory(&bytes).unwrap();
    assert_eq!(loaded, image);
}

#[test]
fn missing_file_is_unreadable() {
    let dir = tempdir().unwrap();
    let err = bitmap::load(dir.path().join("absent.png")).unwrap_err();
    match err {
        Error::UnreadableSource { origin, .. } => assert!(origin.ends_with("absent.png")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_extension_is_unwritable() {
    let dir = tempdir().unwrap();
    let image = dmtx::generate_tag(&Payload::from("x")).unwrap();
    let err = bitmap::save(&image, dir.path().join("tag.nope")).unwrap_err();
    assert!(matches!(err, Error::UnwritableTarget { .. }));
}

#[test]
fn grayscale_file_decodes_like_rgb() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.png");

    let tag = dmtx::generate_tag(&Payload::from("GRAY")).unwrap();
    let gray = image::DynamicImage::ImageRgb8(bitmap::to_bitmap(&tag).unwrap()).to_luma8();
    gray.save(&path).unwrap();

    let loaded = bitmap::load(&path).unwrap();
    let request = DecodeRequest::default();
    let engine = dmtx::DataMatrixEngine::default();
    let tags = dmtx::DecodeEngine::decode(&engine, &loaded, &request).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].payload(), &Payload::from("GRAY"));
}

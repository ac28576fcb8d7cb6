//! Persistence and cropping against files on disk.

use optic_image::{compare, CompareOptions, CropRect, Image, ImageError, Rgba, RgbaImage, Size};
use tempfile::tempdir;

/// 20x20 raster with position-dependent colors, so misplaced crops show.
fn base_raster() -> RgbaImage {
    RgbaImage::from_fn(20, 20, |x, y| {
        Rgba([(x * 12) as u8, (y * 12) as u8, ((x + y) * 6) as u8, 255])
    })
}

#[tokio::test]
async fn test_save_then_compare_round_trip() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.png");
    let copy = dir.path().join("copy.png");

    let image = Image::from_rgba(base_raster());
    image.save(&original).await.unwrap();

    let reloaded = Image::open(&original).await.unwrap();
    reloaded.save(&copy).await.unwrap();

    assert!(compare(&original, &copy, &CompareOptions::strict())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_crop_save_compare_against_reference_crop() {
    let dir = tempdir().unwrap();
    let cropped_path = dir.path().join("cropped.png");
    let reference_path = dir.path().join("reference.png");

    let rect = CropRect {
        top: 1,
        left: 1,
        width: 18,
        height: 18,
    };
    let cropped = Image::from_rgba(base_raster()).crop(rect).unwrap();
    assert_eq!(cropped.size(), Size::new(18, 18));
    cropped.save(&cropped_path).await.unwrap();

    // Independently built 18x18 raster covering the same region.
    let reference = RgbaImage::from_fn(18, 18, |x, y| {
        Rgba([
            ((x + 1) * 12) as u8,
            ((y + 1) * 12) as u8,
            ((x + y + 2) * 6) as u8,
            255,
        ])
    });
    Image::from_rgba(reference)
        .save(&reference_path)
        .await
        .unwrap();

    assert!(compare(&cropped_path, &reference_path, &CompareOptions::strict())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_open_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Image::open(dir.path().join("missing.png")).await.unwrap_err();
    assert!(matches!(err, ImageError::Io(_)));
}

#[tokio::test]
async fn test_open_corrupt_file_is_decode_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let err = Image::open(&path).await.unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)));
}

#[tokio::test]
async fn test_save_to_missing_directory_fails_without_artifact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("image.png");

    let err = Image::from_rgba(base_raster()).save(&path).await.unwrap_err();
    assert!(matches!(err, ImageError::Io(_)));
    assert!(!path.exists());
}

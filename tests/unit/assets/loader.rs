use std::io::Cursor;

use super::*;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_raster_keeps_straight_alpha() {
    let img = RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let decoded = decode_raster(&png_bytes(&img)).unwrap();
    assert_eq!(decoded.dimensions(), (1, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [100, 50, 200, 128]);
}

#[test]
fn decode_raster_rejects_garbage() {
    assert!(decode_raster(b"not an image").is_err());
}

#[test]
fn fs_loader_resolves_under_root() {
    let dir = PathBuf::from("target").join("unit_fs_loader");
    std::fs::create_dir_all(&dir).unwrap();
    let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
    std::fs::write(dir.join("px.png"), png_bytes(&img)).unwrap();

    let loader = FsRasterLoader::new(&dir);
    let loaded = loader.load_raster(Path::new("px.png")).unwrap();
    assert_eq!(loaded.dimensions(), (3, 2));
    assert_eq!(loaded.get_pixel(2, 1).0, [1, 2, 3, 255]);
}

#[test]
fn fs_loader_missing_file_is_asset_error() {
    let loader = FsRasterLoader::new("target/definitely-missing-dir");
    let err = loader.load_raster(Path::new("nope.png")).unwrap_err();
    assert!(matches!(err, CompositeError::AssetLoad { .. }));
}

#[test]
fn memory_loader_returns_copies() {
    let img = RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
    let loader = MemoryRasterLoader::new().with("a.png", img.clone());
    assert_eq!(loader.load_raster(Path::new("a.png")).unwrap(), img);
    assert!(matches!(
        loader.load_raster(Path::new("b.png")),
        Err(CompositeError::AssetLoad { .. })
    ));
}

#[test]
fn memory_loader_accepts_encoded_bytes() {
    let img = RgbaImage::from_pixel(2, 2, image::Rgba([4, 5, 6, 255]));
    let mut loader = MemoryRasterLoader::new();
    loader.insert_encoded("a.png", &png_bytes(&img)).unwrap();
    assert_eq!(loader.load_raster(Path::new("a.png")).unwrap(), img);

    let err = loader.insert_encoded("b.png", b"junk").unwrap_err();
    assert!(matches!(err, CompositeError::AssetLoad { .. }));
}

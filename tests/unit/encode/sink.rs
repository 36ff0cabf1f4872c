use image::{GenericImageView, Rgba};

use super::*;

fn canvas() -> RgbaImage {
    RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 200]))
}

#[test]
fn fs_sink_creates_directory_and_writes_png() {
    let dir = PathBuf::from("target").join("unit_fs_sink").join("nested");
    let _ = std::fs::remove_dir_all(&dir);

    let sink = FsRasterSink::new(&dir);
    let path = sink.save_raster(&canvas(), "out.png").unwrap();
    assert_eq!(path, dir.join("out.png"));

    let back = image::open(&path).unwrap().to_rgba8();
    assert_eq!(back, canvas());
}

#[test]
fn fs_sink_drops_alpha_for_jpeg() {
    let dir = PathBuf::from("target").join("unit_fs_sink_jpeg");
    let sink = FsRasterSink::new(&dir);
    let path = sink.save_raster(&canvas(), "out.jpg").unwrap();
    assert_eq!(image::open(&path).unwrap().dimensions(), (3, 2));
}

#[test]
fn fs_sink_rejects_unknown_extension() {
    let sink = FsRasterSink::new("target/unit_fs_sink_ext");
    let err = sink.save_raster(&canvas(), "out.nope").unwrap_err();
    assert!(matches!(err, CompositeError::Save { .. }));
}

#[test]
fn names_must_stay_inside_output_dir() {
    let sink = MemoryRasterSink::new();
    for bad in ["", "../escape.png", "a/../../b.png"] {
        assert!(matches!(
            sink.save_raster(&canvas(), bad),
            Err(CompositeError::Validation(_))
        ));
    }
    assert!(sink.is_empty());
}

#[test]
fn memory_sink_records_saves_in_order() {
    let sink = MemoryRasterSink::new();
    sink.save_raster(&canvas(), "a.png").unwrap();
    sink.save_raster(&RgbaImage::new(1, 1), "b.png").unwrap();
    sink.save_raster(&RgbaImage::new(5, 5), "a.png").unwrap();

    assert_eq!(sink.len(), 3);
    assert_eq!(sink.names(), ["a.png", "b.png", "a.png"]);
    assert_eq!(sink.get("a.png").unwrap().dimensions(), (5, 5));
    assert!(sink.get("c.png").is_none());
}

use std::path::PathBuf;

use image::Rgba;

use super::*;
use crate::assets::font::FaceOptions;

fn test_face(scale: f64) -> Option<FontFace> {
    let path = std::env::var_os("LAYERCOMP_TEST_FONT")
        .map(PathBuf::from)
        .or_else(|| {
            [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/Library/Fonts/Arial.ttf",
                r"C:\Windows\Fonts\arial.ttf",
            ]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
        })?;
    let bytes = std::fs::read(&path).ok()?;
    FontFace::from_bytes("test", &path, bytes, FaceOptions::for_scale(scale)).ok()
}

fn style(align: Align) -> TextStyle {
    TextStyle {
        color: Rgba8::opaque(0, 0, 0),
        align,
        opacity: 1.0,
    }
}

#[test]
fn split_on_literal_marker_only() {
    assert_eq!(split_lines(r"A\nB\nC"), ["A", "B", "C"]);
    assert_eq!(split_lines("one\ntwo"), ["one\ntwo"]);
    assert_eq!(split_lines(""), [""]);
    assert_eq!(split_lines(r"x\n"), ["x", ""]);
}

#[test]
fn alignment_offsets() {
    assert_eq!(line_origin_x(Align::Left, 300, 60), 300);
    assert_eq!(line_origin_x(Align::Center, 300, 60), 270);
    assert_eq!(line_origin_x(Align::Right, 300, 60), 240);
    assert_eq!(line_origin_x(Align::Center, 300, 61), 270);
}

#[test]
fn lines_stack_by_line_height() {
    let lines = layout_lines(r"A\nB\nC", PixelPoint::new(50, 100), Align::Left, 20, |_| 10);
    let ys: Vec<_> = lines.iter().map(|l| l.origin.y).collect();
    assert_eq!(ys, [100, 120, 140]);
    assert!(lines.iter().all(|l| l.origin.x == 50));
}

#[test]
fn each_line_aligns_on_its_own_width() {
    let lines = layout_lines(
        r"abcd\nab",
        PixelPoint::new(100, 0),
        Align::Center,
        10,
        |l| l.len() as i64 * 10,
    );
    assert_eq!(lines[0].origin.x, 80);
    assert_eq!(lines[0].width, 40);
    assert_eq!(lines[1].origin.x, 90);
    assert_eq!(lines[1].width, 20);
}

#[test]
fn draw_text_marks_pixels_near_anchor() {
    let Some(face) = test_face(4.0) else {
        eprintln!("no test font available; skipping");
        return;
    };
    let mut canvas = RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255]));
    let lines = draw_text(
        &mut canvas,
        &face,
        "HH",
        Position::new(50.0, 50.0),
        style(Align::Center),
    );
    assert_eq!(lines.len(), 1);
    let origin = lines[0].origin;
    assert_eq!(origin.y, 100);
    assert_eq!(origin.x, 200 - lines[0].width / 2);

    let dark = canvas.pixels().filter(|p| p.0[0] < 128).count();
    assert!(dark > 0);
    // Nothing is drawn below the baseline for capital H.
    for x in 0..400 {
        assert_eq!(canvas.get_pixel(x, 110).0, [255, 255, 255, 255]);
    }
}

#[test]
fn draw_text_clips_at_canvas_edges() {
    let Some(face) = test_face(6.0) else {
        eprintln!("no test font available; skipping");
        return;
    };
    let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
    draw_text(
        &mut canvas,
        &face,
        r"WWWW\nWWWW",
        Position::new(0.0, 0.0),
        style(Align::Right),
    );
    draw_text(
        &mut canvas,
        &face,
        "WWWW",
        Position::new(100.0, 100.0),
        style(Align::Left),
    );
    assert_eq!(canvas.dimensions(), (40, 40));
}

#[test]
fn zero_opacity_draws_nothing() {
    let Some(face) = test_face(3.0) else {
        eprintln!("no test font available; skipping");
        return;
    };
    let mut canvas = RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]));
    let before = canvas.clone();
    let mut s = style(Align::Left);
    s.opacity = 0.0;
    draw_text(&mut canvas, &face, "Hello", Position::new(10.0, 50.0), s);
    assert_eq!(canvas, before);
}

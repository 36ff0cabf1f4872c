use image::RgbaImage;
use rusttype::point;

use crate::assets::font::FontFace;
use crate::foundation::core::{PixelPoint, Position, Rgba8};
use crate::foundation::math::over_straight;
use crate::scene::model::Align;

/// Two-character line break marker recognized inside layer text.
pub const LINE_BREAK_MARKER: &str = "\\n";

/// Split `text` on the literal `\n` marker. Real line-feed bytes are left untouched.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(LINE_BREAK_MARKER).collect()
}

/// Left edge of a line of `width` pixels aligned against `anchor_x`.
pub fn line_origin_x(align: Align, anchor_x: i64, width: i64) -> i64 {
    match align {
        Align::Left => anchor_x,
        Align::Center => anchor_x - width / 2,
        Align::Right => anchor_x - width,
    }
}

/// Baseline of line `index`; line 0 sits on the anchor and later lines stack downward.
pub fn line_baseline_y(anchor_y: i64, index: usize, line_height: i64) -> i64 {
    anchor_y + index as i64 * line_height
}

/// Resolved placement of one text line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinePlacement<'a> {
    /// Line content without the break marker.
    pub text: &'a str,
    /// Left edge on the baseline.
    pub origin: PixelPoint,
    /// Measured width in pixels.
    pub width: i64,
}

/// Resolve every line's origin from the anchor, alignment and face metrics.
///
/// `measure` returns a line's rendered width in whole pixels.
pub fn layout_lines<'a>(
    text: &'a str,
    anchor: PixelPoint,
    align: Align,
    line_height: i64,
    measure: impl Fn(&str) -> i64,
) -> Vec<LinePlacement<'a>> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let width = measure(line);
            LinePlacement {
                text: line,
                origin: PixelPoint::new(
                    line_origin_x(align, anchor.x, width),
                    line_baseline_y(anchor.y, i, line_height),
                ),
                width,
            }
        })
        .collect()
}

/// Style of a text draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Solid fill color.
    pub color: Rgba8,
    /// Line alignment.
    pub align: Align,
    /// Blend weight in `[0, 1]`.
    pub opacity: f32,
}

/// Lay out `text` at `position` and rasterize it onto `canvas`.
///
/// Returns the placements used, in line order.
pub fn draw_text<'a>(
    canvas: &mut RgbaImage,
    face: &FontFace,
    text: &'a str,
    position: Position,
    style: TextStyle,
) -> Vec<LinePlacement<'a>> {
    let anchor = position.resolve(canvas.width(), canvas.height());
    let lines = layout_lines(text, anchor, style.align, face.line_height(), |l| {
        face.measure(l)
    });
    for line in &lines {
        rasterize_line(canvas, face, line.text, line.origin, style);
    }
    tracing::trace!(
        lines = lines.len(),
        x = anchor.x,
        y = anchor.y,
        font = face.font_id(),
        "draw text"
    );
    lines
}

/// Rasterize one line with its baseline-left origin at `origin`, clipping to the canvas.
pub fn rasterize_line(
    canvas: &mut RgbaImage,
    face: &FontFace,
    line: &str,
    origin: PixelPoint,
    style: TextStyle,
) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let [r, g, b, a] = style.color.to_array();

    for placed in face.layout_line(line).glyphs {
        let glyph = placed
            .glyph
            .positioned(point(origin.x as f32 + placed.x, origin.y as f32));
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        if i64::from(bb.max.x) <= 0
            || i64::from(bb.max.y) <= 0
            || i64::from(bb.min.x) >= cw
            || i64::from(bb.min.y) >= ch
        {
            continue;
        }

        glyph.draw(|gx, gy, coverage| {
            let x = i64::from(bb.min.x) + i64::from(gx);
            let y = i64::from(bb.min.y) + i64::from(gy);
            if x < 0 || y < 0 || x >= cw || y >= ch {
                return;
            }
            let alpha = (coverage.clamp(0.0, 1.0) * f32::from(a)).round() as u8;
            let px = canvas.get_pixel_mut(x as u32, y as u32);
            px.0 = over_straight(px.0, [r, g, b, alpha], style.opacity);
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::foundation::core::{PixelPoint, Position};
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::foundation::math::{clip_span, over_straight};
use crate::scene::model::ScaleMode;

/// Largest width or height a resize may produce.
pub const MAX_DIMENSION: u32 = 32_768;

/// Resampling filter used for every resize.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Target size of a `src_w × src_h` image resized by `scale` under `mode`.
///
/// Products are truncated to whole pixels. In [`ScaleMode::Width`] the height is derived from the
/// source aspect ratio and rounded to nearest.
pub fn scaled_size(
    src_w: u32,
    src_h: u32,
    scale: f64,
    mode: ScaleMode,
) -> CompositeResult<(u32, u32)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CompositeError::resize(format!(
            "scale must be finite and > 0 (got {scale})"
        )));
    }
    if src_w == 0 || src_h == 0 {
        return Err(CompositeError::resize("source image is empty"));
    }

    let w = (f64::from(src_w) * scale).trunc();
    let h = match mode {
        ScaleMode::Both => (f64::from(src_h) * scale).trunc(),
        ScaleMode::Width => (w * f64::from(src_h) / f64::from(src_w)).round().max(1.0),
    };

    check_dimensions(w, h)
}

fn check_dimensions(w: f64, h: f64) -> CompositeResult<(u32, u32)> {
    if w < 1.0 || h < 1.0 {
        return Err(CompositeError::resize(format!(
            "resized image would be empty ({w}x{h})"
        )));
    }
    if w > f64::from(MAX_DIMENSION) || h > f64::from(MAX_DIMENSION) {
        return Err(CompositeError::resize(format!(
            "resized image {w}x{h} exceeds {MAX_DIMENSION}px"
        )));
    }
    Ok((w as u32, h as u32))
}

/// Resize `img` to exactly `width × height` with the Lanczos filter.
pub fn resize_exact(img: &RgbaImage, width: u32, height: u32) -> CompositeResult<RgbaImage> {
    let (w, h) = check_dimensions(f64::from(width), f64::from(height))?;
    if img.dimensions() == (w, h) {
        return Ok(img.clone());
    }
    Ok(imageops::resize(img, w, h, RESAMPLE_FILTER))
}

/// Resize `src` by `scale` under `mode`.
pub fn scale_image(src: &RgbaImage, scale: f64, mode: ScaleMode) -> CompositeResult<RgbaImage> {
    let (w, h) = scaled_size(src.width(), src.height(), scale, mode)?;
    resize_exact(src, w, h)
}

/// Top-left pixel of a `size`-sized image whose center sits on the anchor resolved from
/// `position`.
pub fn centered_placement(canvas: (u32, u32), position: Position, size: (u32, u32)) -> PixelPoint {
    let anchor = position.resolve(canvas.0, canvas.1);
    PixelPoint::new(
        anchor.x - i64::from(size.0 / 2),
        anchor.y - i64::from(size.1 / 2),
    )
}

/// Alpha-composite `src` onto `canvas` with its top-left corner at `top_left`.
///
/// Pixels falling outside the canvas are dropped.
pub fn overlay(canvas: &mut RgbaImage, src: &RgbaImage, top_left: PixelPoint, opacity: f32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let Some((sx0, dx0, cols)) = clip_span(top_left.x, sw, cw) else {
        return;
    };
    let Some((sy0, dy0, rows)) = clip_span(top_left.y, sh, ch) else {
        return;
    };

    for row in 0..rows {
        for col in 0..cols {
            let s = src.get_pixel(sx0 + col, sy0 + row).0;
            let d = canvas.get_pixel_mut(dx0 + col, dy0 + row);
            d.0 = over_straight(d.0, s, opacity);
        }
    }
}

/// Scale `src`, center it on the anchor and blend it onto `canvas`.
///
/// Returns the top-left placement used.
pub fn blend_image(
    canvas: &mut RgbaImage,
    src: &RgbaImage,
    position: Position,
    scale: f64,
    mode: ScaleMode,
    opacity: f64,
) -> CompositeResult<PixelPoint> {
    let scaled = scale_image(src, scale, mode)?;
    let top_left = centered_placement(canvas.dimensions(), position, scaled.dimensions());
    tracing::trace!(
        w = scaled.width(),
        h = scaled.height(),
        x = top_left.x,
        y = top_left.y,
        "blend image"
    );
    overlay(canvas, &scaled, top_left, opacity as f32);
    Ok(top_left)
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;

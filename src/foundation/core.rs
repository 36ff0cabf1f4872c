/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Fully opaque color from three channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Channels as an `[r, g, b, a]` array, the layout used by `image::Rgba`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Rgba8> for image::Rgba<u8> {
    fn from(c: Rgba8) -> Self {
        image::Rgba(c.to_array())
    }
}

/// Layer position expressed as a percentage of canvas width and height.
///
/// Values are nominally in `[0, 100]` but are never clamped; a layer may be placed partially or
/// fully outside the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Horizontal percentage of canvas width.
    pub x: f64,
    /// Vertical percentage of canvas height.
    pub y: f64,
}

impl Position {
    /// Create a percentage position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Resolve to a canvas pixel (the layer anchor).
    ///
    /// Fractional results are truncated toward zero.
    pub fn resolve(self, canvas_width: u32, canvas_height: u32) -> PixelPoint {
        PixelPoint {
            x: (f64::from(canvas_width) * (self.x / 100.0)) as i64,
            y: (f64::from(canvas_height) * (self.y / 100.0)) as i64,
        }
    }
}

/// Integer pixel coordinate in canvas space. May lie outside the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl PixelPoint {
    /// Create a pixel point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Explicit output canvas size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSize {
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
}

impl OutputSize {
    /// Return `(width, height)` when both dimensions are positive and fit in `u32`.
    pub fn effective(self) -> Option<(u32, u32)> {
        let w = u32::try_from(self.width).ok().filter(|w| *w > 0)?;
        let h = u32::try_from(self.height).ok().filter(|h| *h > 0)?;
        Some((w, h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

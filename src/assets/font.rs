//! Font lookup, face construction and the process-wide face cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rusttype::{Font, GlyphId, Scale, ScaledGlyph, VMetrics};

use crate::foundation::error::{CompositeError, CompositeResult};

/// Point size of a text layer at `scale == 1.0`.
pub const BASE_POINT_SIZE: f32 = 12.0;
/// Resolution faces are built at. At 72 DPI one point is one pixel.
pub const DEFAULT_DPI: f32 = 72.0;
/// Largest em size, in pixels, a face may be built at.
///
/// Glyph coverage is rasterized over the whole glyph box before clipping, so the em size bounds
/// per-glyph memory.
pub const MAX_EM_PX: f32 = 4096.0;

/// Glyph placement hinting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Hinting {
    /// Fractional advances and origins.
    None,
    /// Advances, kerning and glyph origins snap to whole pixels.
    #[default]
    Full,
}

/// Size and rendering options a face is bound to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceOptions {
    /// Em size in points.
    pub size_pt: f32,
    /// Dots per inch used to convert points to pixels.
    pub dpi: f32,
    /// Hinting mode.
    pub hinting: Hinting,
}

impl FaceOptions {
    /// Options for a text layer with the given size multiplier: `12pt * scale` at 72 DPI with full
    /// hinting.
    pub fn for_scale(scale: f64) -> Self {
        Self {
            size_pt: BASE_POINT_SIZE * scale as f32,
            dpi: DEFAULT_DPI,
            hinting: Hinting::Full,
        }
    }

    /// Em size in pixels.
    pub fn em_px(&self) -> f32 {
        self.size_pt * self.dpi / 72.0
    }

    fn validate(&self) -> CompositeResult<()> {
        if !self.size_pt.is_finite() || self.size_pt <= 0.0 {
            return Err(CompositeError::font_face(format!(
                "point size must be finite and > 0 (got {})",
                self.size_pt
            )));
        }
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(CompositeError::font_face(format!(
                "dpi must be finite and > 0 (got {})",
                self.dpi
            )));
        }
        let em_px = self.em_px();
        if !em_px.is_finite() || em_px > MAX_EM_PX {
            return Err(CompositeError::font_face(format!(
                "em size {em_px}px exceeds {MAX_EM_PX}px"
            )));
        }
        Ok(())
    }
}

/// One glyph of a laid-out line, positioned relative to the line origin on the baseline.
#[derive(Clone)]
pub struct PlacedGlyph {
    /// Scaled glyph ready to be positioned.
    pub glyph: ScaledGlyph<'static>,
    /// Horizontal offset from the line origin in pixels.
    pub x: f32,
}

/// Glyph run for a single line of text.
#[derive(Clone)]
pub struct LineLayout {
    /// Glyphs in visual (input) order.
    pub glyphs: Vec<PlacedGlyph>,
    /// Total horizontal advance in pixels.
    pub advance: f32,
}

impl LineLayout {
    /// Rendered width rounded up to whole pixels.
    pub fn width_px(&self) -> i64 {
        self.advance.ceil() as i64
    }
}

/// A parsed outline font bound to one size, resolution and hinting mode.
pub struct FontFace {
    font_id: String,
    options: FaceOptions,
    font: Font<'static>,
    scale: Scale,
    v_metrics: VMetrics,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("font_id", &self.font_id)
            .field("options", &self.options)
            .field("line_height", &self.line_height())
            .finish_non_exhaustive()
    }
}

impl FontFace {
    /// Parse `bytes` as an outline font and build a face with `options`.
    ///
    /// `path` is only used for error reporting.
    pub fn from_bytes(
        font_id: &str,
        path: &Path,
        bytes: Vec<u8>,
        options: FaceOptions,
    ) -> CompositeResult<Self> {
        options.validate()?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| CompositeError::FontParse {
            path: path.to_path_buf(),
        })?;

        let units_per_em = f32::from(font.units_per_em());
        if units_per_em <= 0.0 {
            return Err(CompositeError::font_face(format!(
                "font '{font_id}' reports zero units per em"
            )));
        }

        // rusttype scales so that ascent - descent spans the requested height; convert the em
        // size into that height.
        let unscaled = font.v_metrics_unscaled();
        let extent_units = unscaled.ascent - unscaled.descent;
        if !extent_units.is_finite() || extent_units <= 0.0 {
            return Err(CompositeError::font_face(format!(
                "font '{font_id}' has degenerate vertical metrics"
            )));
        }
        let height_px = options.em_px() * extent_units / units_per_em;
        let scale = Scale::uniform(height_px);
        let v_metrics = font.v_metrics(scale);

        Ok(Self {
            font_id: font_id.to_owned(),
            options,
            font,
            scale,
            v_metrics,
        })
    }

    /// Identifier the face was resolved from.
    pub fn font_id(&self) -> &str {
        &self.font_id
    }

    /// Options the face is bound to.
    pub fn options(&self) -> FaceOptions {
        self.options
    }

    /// Distance from baseline to the top of the tallest glyphs, in pixels.
    pub fn ascent(&self) -> f32 {
        self.v_metrics.ascent
    }

    /// Baseline-to-baseline distance: ascent plus descent, rounded up.
    pub fn line_height(&self) -> i64 {
        (self.v_metrics.ascent - self.v_metrics.descent).ceil() as i64
    }

    /// Lay out a single line without wrapping, applying pair kerning.
    pub fn layout_line(&self, line: &str) -> LineLayout {
        let mut glyphs = Vec::with_capacity(line.len());
        let mut caret = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in line.chars() {
            let glyph = self.font.glyph(ch).scaled(self.scale);
            let id = glyph.id();
            if let Some(prev) = prev {
                caret += self.hint(self.font.pair_kerning(self.scale, prev, id));
            }
            let advance = self.hint(glyph.h_metrics().advance_width);
            glyphs.push(PlacedGlyph { glyph, x: caret });
            caret += advance;
            prev = Some(id);
        }

        LineLayout {
            glyphs,
            advance: caret,
        }
    }

    /// Rendered width of `line` in whole pixels.
    pub fn measure(&self, line: &str) -> i64 {
        self.layout_line(line).width_px()
    }

    fn hint(&self, v: f32) -> f32 {
        match self.options.hinting {
            Hinting::Full => v.round(),
            Hinting::None => v,
        }
    }
}

/// Maps a font identifier to a font file.
pub trait FontResolver: Send + Sync {
    /// Locate the font file for `font_id`.
    fn resolve_font_path(&self, font_id: &str) -> CompositeResult<PathBuf>;
}

/// Reject identifiers that would escape the font directory.
fn check_font_id(font_id: &str) -> CompositeResult<()> {
    if font_id.is_empty() {
        return Err(CompositeError::validation("font id must be non-empty"));
    }
    if font_id.contains(['/', '\\']) || font_id == ".." {
        return Err(CompositeError::validation(format!(
            "font id '{font_id}' must be a bare family name"
        )));
    }
    Ok(())
}

fn existing_font_file(dir: &Path, font_id: &str) -> CompositeResult<PathBuf> {
    check_font_id(font_id)?;
    let path = dir.join(format!("{font_id}.ttf"));
    if !path.is_file() {
        return Err(CompositeError::FontNotFound { path });
    }
    Ok(path)
}

/// Platform font directory lookup: `<fonts dir>/<font_id>.ttf`.
///
/// Only Windows (`C:\Windows\Fonts`) and macOS (`/Library/Fonts`) have a known directory; every
/// other host fails with [`CompositeError::UnsupportedPlatform`]. Use [`FontDirResolver`] to
/// point at an explicit directory instead.
#[derive(Clone, Debug)]
pub struct SystemFontDirs {
    os: String,
}

impl Default for SystemFontDirs {
    fn default() -> Self {
        Self::for_os(std::env::consts::OS)
    }
}

impl SystemFontDirs {
    /// Lookup for an explicit operating system name (as in `std::env::consts::OS`).
    pub fn for_os(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }

    /// Font directory of the configured operating system.
    pub fn font_dir(&self) -> CompositeResult<PathBuf> {
        match self.os.as_str() {
            "windows" => Ok(PathBuf::from(r"C:\Windows\Fonts")),
            "macos" => Ok(PathBuf::from("/Library/Fonts")),
            other => Err(CompositeError::UnsupportedPlatform(other.to_owned())),
        }
    }
}

impl FontResolver for SystemFontDirs {
    fn resolve_font_path(&self, font_id: &str) -> CompositeResult<PathBuf> {
        let dir = self.font_dir()?;
        existing_font_file(&dir, font_id)
    }
}

/// Font lookup in one explicit directory: `<dir>/<font_id>.ttf`.
#[derive(Clone, Debug)]
pub struct FontDirResolver {
    dir: PathBuf,
}

impl FontDirResolver {
    /// Resolve fonts inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FontResolver for FontDirResolver {
    fn resolve_font_path(&self, font_id: &str) -> CompositeResult<PathBuf> {
        existing_font_file(&self.dir, font_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    font_id: String,
    size_bits: u32,
    dpi_bits: u32,
    hinting: Hinting,
}

impl FaceKey {
    fn new(font_id: &str, options: FaceOptions) -> Self {
        Self {
            font_id: font_id.to_owned(),
            size_bits: options.size_pt.to_bits(),
            dpi_bits: options.dpi.to_bits(),
            hinting: options.hinting,
        }
    }
}

/// Slot for one face; its mutex serializes the first load of that key only.
type FaceSlot = Arc<Mutex<Option<Arc<FontFace>>>>;

/// Lazily loaded, never evicted cache of font faces.
///
/// Faces are keyed by font identifier and face options, so one font used at two scales yields two
/// faces. Each key has its own slot lock: concurrent jobs asking for the same key load it once and
/// share the result, while a cold load never blocks lookups of other keys.
pub struct FontCache {
    resolver: Box<dyn FontResolver>,
    slots: Mutex<HashMap<FaceKey, FaceSlot>>,
}

impl std::fmt::Debug for FontCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCache")
            .field("faces", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(SystemFontDirs::default())
    }
}

impl FontCache {
    /// Create an empty cache resolving font files through `resolver`.
    pub fn new(resolver: impl FontResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached face for `(font_id, options)`, loading it on first use.
    ///
    /// Options are validated before any lookup. Failures are not cached; a later call retries.
    pub fn face(&self, font_id: &str, options: FaceOptions) -> CompositeResult<Arc<FontFace>> {
        options.validate()?;
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(FaceKey::new(font_id, options)).or_default())
        };

        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(face) = slot.as_ref() {
            return Ok(Arc::clone(face));
        }

        let face = Arc::new(self.load(font_id, options)?);
        *slot = Some(Arc::clone(&face));
        Ok(face)
    }

    fn load(&self, font_id: &str, options: FaceOptions) -> CompositeResult<FontFace> {
        let path = self.resolver.resolve_font_path(font_id)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "font read failed");
            CompositeError::FontNotFound { path: path.clone() }
        })?;
        let face = FontFace::from_bytes(font_id, &path, bytes, options)?;
        tracing::debug!(
            font_id,
            path = %path.display(),
            size_pt = options.size_pt,
            line_height = face.line_height(),
            "loaded font face"
        );
        Ok(face)
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        let slots: Vec<FaceSlot> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Return `true` when no face has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;

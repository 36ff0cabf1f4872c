use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::foundation::error::{CompositeError, CompositeResult};

/// Destination for finished canvases.
///
/// Sinks are shared between batch workers, so `save_raster` takes `&self`.
pub trait RasterSink: Send + Sync {
    /// Persist `canvas` under `name` and return where it went.
    fn save_raster(&self, canvas: &RgbaImage, name: &str) -> CompositeResult<PathBuf>;
}

/// Writes canvases into an output directory, creating it on demand.
///
/// The encoding is chosen from the file extension of `name`.
#[derive(Clone, Debug)]
pub struct FsRasterSink {
    dir: PathBuf,
}

impl FsRasterSink {
    /// Write into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn check_output_name(name: &str) -> CompositeResult<()> {
    if name.is_empty() {
        return Err(CompositeError::validation("output file name must be non-empty"));
    }
    if Path::new(name).is_absolute() || name.split(['/', '\\']).any(|part| part == "..") {
        return Err(CompositeError::validation(format!(
            "output file name '{name}' must stay inside the output directory"
        )));
    }
    Ok(())
}

impl RasterSink for FsRasterSink {
    fn save_raster(&self, canvas: &RgbaImage, name: &str) -> CompositeResult<PathBuf> {
        check_output_name(name)?;
        let path = self.dir.join(name);
        let format = ImageFormat::from_path(&path).map_err(|e| CompositeError::save(&path, e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompositeError::save(&path, e))?;
        }

        // JPEG has no alpha channel.
        let saved = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(canvas.clone())
                .to_rgb8()
                .save_with_format(&path, format),
            _ => canvas.save_with_format(&path, format),
        };
        saved.map_err(|e| CompositeError::save(&path, e))?;

        tracing::debug!(path = %path.display(), w = canvas.width(), h = canvas.height(), "saved");
        Ok(path)
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryRasterSink {
    saved: Mutex<Vec<(String, RgbaImage)>>,
}

impl MemoryRasterSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names saved so far, in save order.
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    /// The most recent canvas saved under `name`.
    pub fn get(&self, name: &str) -> Option<RgbaImage> {
        self.lock()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, img)| img.clone())
    }

    /// Number of saves.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` when nothing was saved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, RgbaImage)>> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RasterSink for MemoryRasterSink {
    fn save_raster(&self, canvas: &RgbaImage, name: &str) -> CompositeResult<PathBuf> {
        check_output_name(name)?;
        self.lock().push((name.to_owned(), canvas.clone()));
        Ok(PathBuf::from(name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

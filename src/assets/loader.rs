use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::foundation::error::{CompositeError, CompositeResult};

/// Source of decoded rasters for backgrounds and image layers.
///
/// Paths are passed exactly as written in the configuration; implementations decide how to
/// resolve them.
pub trait RasterLoader: Send + Sync {
    /// Load and decode the raster at `path` into straight RGBA8.
    fn load_raster(&self, path: &Path) -> CompositeResult<RgbaImage>;
}

/// Decode an encoded image (any format supported by `image`) into straight RGBA8.
pub fn decode_raster(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Loads rasters from files under a root directory.
#[derive(Clone, Debug)]
pub struct FsRasterLoader {
    root: PathBuf,
}

impl FsRasterLoader {
    /// Resolve configuration paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RasterLoader for FsRasterLoader {
    fn load_raster(&self, path: &Path) -> CompositeResult<RgbaImage> {
        let full = self.root.join(path);
        let img = image::open(&full).map_err(|e| CompositeError::asset_load(&full, e))?;
        tracing::trace!(path = %full.display(), w = img.width(), h = img.height(), "loaded raster");
        Ok(img.to_rgba8())
    }
}

/// In-memory raster table keyed by configuration path.
#[derive(Clone, Debug, Default)]
pub struct MemoryRasterLoader {
    rasters: HashMap<PathBuf, RgbaImage>,
}

impl MemoryRasterLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `img` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<PathBuf>, img: RgbaImage) {
        self.rasters.insert(path.into(), img);
    }

    /// Decode `bytes` and register the result under `path`.
    pub fn insert_encoded(
        &mut self,
        path: impl Into<PathBuf>,
        bytes: &[u8],
    ) -> CompositeResult<()> {
        let path = path.into();
        let img = decode_raster(bytes).map_err(|e| CompositeError::asset_load(&path, e))?;
        self.rasters.insert(path, img);
        Ok(())
    }

    /// Builder-style [`MemoryRasterLoader::insert`].
    pub fn with(mut self, path: impl Into<PathBuf>, img: RgbaImage) -> Self {
        self.insert(path, img);
        self
    }
}

impl RasterLoader for MemoryRasterLoader {
    fn load_raster(&self, path: &Path) -> CompositeResult<RgbaImage> {
        self.rasters
            .get(path)
            .cloned()
            .ok_or_else(|| CompositeError::asset_load(path, "no such raster"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::assets::font::FontCache;
use crate::assets::loader::RasterLoader;
use crate::encode::sink::RasterSink;
use crate::foundation::error::CompositeResult;
use crate::render::pipeline::CompositionPipeline;
use crate::scene::model::CompositionConfig;

/// Output name used when neither the configuration nor its source path provides one.
pub const FALLBACK_OUTPUT_NAME: &str = "output.png";

/// Output file name for `config`: `outputImg.fileName` when present, else `<config stem>.png`.
pub fn output_name_for(config: &CompositionConfig, config_path: &Path) -> String {
    if let Some(name) = &config.output.file_name {
        return name.clone();
    }
    config_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|stem| format!("{stem}.png"))
        .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_owned())
}

/// Runs composition jobs end to end: load background, compose, save.
///
/// Cloning is cheap; clones share the loader, the font cache and the sink.
#[derive(Clone)]
pub struct JobRunner {
    loader: Arc<dyn RasterLoader>,
    fonts: Arc<FontCache>,
    sink: Arc<dyn RasterSink>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Build a runner from its collaborators.
    pub fn new(
        loader: Arc<dyn RasterLoader>,
        fonts: Arc<FontCache>,
        sink: Arc<dyn RasterSink>,
    ) -> Self {
        Self {
            loader,
            fonts,
            sink,
        }
    }

    /// Shared font cache.
    pub fn fonts(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    /// Load the background and compose `config` without saving.
    pub fn render(&self, config: &CompositionConfig) -> CompositeResult<RgbaImage> {
        let background = self.loader.load_raster(&config.background.asset_path)?;
        CompositionPipeline::new(&self.fonts, self.loader.as_ref()).compose(config, &background)
    }

    /// Render `config` and save it under its output name, or `default_name` when it has none.
    ///
    /// Nothing is saved when any step fails.
    #[tracing::instrument(skip_all, fields(bg = %config.background.asset_path.display()))]
    pub fn run(&self, config: &CompositionConfig, default_name: &str) -> CompositeResult<PathBuf> {
        let canvas = self.render(config)?;
        let name = config.output.file_name.as_deref().unwrap_or(default_name);
        let path = self.sink.save_raster(&canvas, name)?;
        tracing::info!(out = %path.display(), "composed");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;

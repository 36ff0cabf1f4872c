//! layercomp composes a background image with depth-ordered image and text layers.
//!
//! A job is described by a [`CompositionConfig`] (usually decoded from JSON):
//!
//! - Decode the configuration with [`CompositionConfig::load`]
//! - Compose it with a [`CompositionPipeline`], or end to end with a [`JobRunner`]
//! - Run many configurations concurrently with [`run_batch`]
//!
//! Collaborators sit behind traits: [`RasterLoader`] for decoded rasters, [`FontResolver`] for
//! font files and [`RasterSink`] for finished canvases. Filesystem and in-memory implementations
//! of each are provided.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod encode;
mod foundation;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{OutputSize, PixelPoint, Position, Rgba8};
pub use crate::foundation::error::{CompositeError, CompositeResult};

pub use crate::assets::color::parse_hex_color;
pub use crate::assets::font::{
    BASE_POINT_SIZE, DEFAULT_DPI, FaceOptions, FontCache, FontDirResolver, FontFace, FontResolver,
    Hinting, LineLayout, MAX_EM_PX, PlacedGlyph, SystemFontDirs,
};
pub use crate::assets::loader::{FsRasterLoader, MemoryRasterLoader, RasterLoader, decode_raster};

pub use crate::scene::model::{
    Align, BackgroundSpec, CompositeItem, CompositionConfig, LayerPayload, OutputSpec, ScaleMode,
};

pub use crate::render::blend::{
    MAX_DIMENSION, RESAMPLE_FILTER, blend_image, centered_placement, overlay, resize_exact,
    scale_image, scaled_size,
};
pub use crate::render::order::order_layers;
pub use crate::render::pipeline::{CompositionPipeline, PipelineState};
pub use crate::render::text::{
    LINE_BREAK_MARKER, LinePlacement, TextStyle, draw_text, layout_lines, line_baseline_y,
    line_origin_x, rasterize_line, split_lines,
};

pub use crate::encode::sink::{FsRasterSink, MemoryRasterSink, RasterSink};
pub use crate::session::batch::{BatchJob, BatchReport, JobOutcome, discover_configs, run_batch};
pub use crate::session::job::{FALLBACK_OUTPUT_NAME, JobRunner, output_name_for};

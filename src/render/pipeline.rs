use image::RgbaImage;

use crate::assets::color::parse_hex_color;
use crate::assets::font::{FaceOptions, FontCache};
use crate::assets::loader::RasterLoader;
use crate::foundation::error::{CompositeError, CompositeResult};
use crate::render::blend::{blend_image, resize_exact};
use crate::render::order::order_layers;
use crate::render::text::{TextStyle, draw_text};
use crate::scene::model::{CompositeItem, CompositionConfig, LayerPayload};

/// Step of a composition job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Copy the background into a fresh canvas.
    LoadBackground,
    /// Sort layers into draw order.
    OrderLayers,
    /// Draw the layer at this position in draw order.
    DrawLayer(usize),
    /// Apply the optional final resize.
    ResizeOutput,
    /// Canvas is complete.
    Done,
    /// A step failed; the job was aborted.
    Failed,
}

/// Per-job mutable state. The canvas is owned here and nowhere else.
struct Run<'c> {
    state: PipelineState,
    canvas: RgbaImage,
    ordered: Vec<&'c CompositeItem>,
}

/// Composes one configuration onto a background.
///
/// The pipeline borrows its collaborators; a shared [`FontCache`] may be used by many pipelines
/// at once.
#[derive(Clone, Copy)]
pub struct CompositionPipeline<'a> {
    fonts: &'a FontCache,
    loader: &'a dyn RasterLoader,
}

impl std::fmt::Debug for CompositionPipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionPipeline")
            .field("fonts", self.fonts)
            .finish_non_exhaustive()
    }
}

impl<'a> CompositionPipeline<'a> {
    /// Pipeline resolving fonts through `fonts` and image layers through `loader`.
    pub fn new(fonts: &'a FontCache, loader: &'a dyn RasterLoader) -> Self {
        Self { fonts, loader }
    }

    /// Draw every layer of `config` over a copy of `background` and return the finished canvas.
    ///
    /// `background` is not modified. The first failing step aborts the job and its error is
    /// returned; no partial canvas escapes.
    pub fn compose(
        &self,
        config: &CompositionConfig,
        background: &RgbaImage,
    ) -> CompositeResult<RgbaImage> {
        self.compose_traced(config, background).0
    }

    /// [`CompositionPipeline::compose`], also returning every state the job passed through.
    ///
    /// The trail ends in [`PipelineState::Done`] or [`PipelineState::Failed`].
    #[tracing::instrument(level = "debug", skip_all, fields(layers = config.layers.len()))]
    pub fn compose_traced(
        &self,
        config: &CompositionConfig,
        background: &RgbaImage,
    ) -> (CompositeResult<RgbaImage>, Vec<PipelineState>) {
        let mut run = Run {
            state: PipelineState::LoadBackground,
            canvas: RgbaImage::new(0, 0),
            ordered: Vec::new(),
        };
        let mut trail = vec![run.state];

        loop {
            match self.step(&mut run, config, background) {
                Ok(next) => run.state = next,
                Err(e) => {
                    tracing::debug!(state = ?run.state, error = %e, "composition failed");
                    run.state = PipelineState::Failed;
                    trail.push(run.state);
                    return (Err(e), trail);
                }
            }
            trail.push(run.state);
            if run.state == PipelineState::Done {
                tracing::debug!(
                    w = run.canvas.width(),
                    h = run.canvas.height(),
                    "composition done"
                );
                return (Ok(run.canvas), trail);
            }
        }
    }

    fn step<'c>(
        &self,
        run: &mut Run<'c>,
        config: &'c CompositionConfig,
        background: &RgbaImage,
    ) -> CompositeResult<PipelineState> {
        match run.state {
            PipelineState::LoadBackground => {
                if background.width() == 0 || background.height() == 0 {
                    return Err(CompositeError::asset_load(
                        &config.background.asset_path,
                        "background image is empty",
                    ));
                }
                run.canvas = background.clone();
                Ok(PipelineState::OrderLayers)
            }
            PipelineState::OrderLayers => {
                run.ordered = order_layers(&config.layers);
                Ok(if run.ordered.is_empty() {
                    PipelineState::ResizeOutput
                } else {
                    PipelineState::DrawLayer(0)
                })
            }
            PipelineState::DrawLayer(i) => {
                let item = run.ordered[i];
                self.draw_layer(&mut run.canvas, item)?;
                Ok(if i + 1 < run.ordered.len() {
                    PipelineState::DrawLayer(i + 1)
                } else {
                    PipelineState::ResizeOutput
                })
            }
            PipelineState::ResizeOutput => {
                if let Some((w, h)) = config.output.size.and_then(|s| s.effective()) {
                    tracing::debug!(w, h, "resizing output");
                    run.canvas = resize_exact(&run.canvas, w, h)?;
                }
                Ok(PipelineState::Done)
            }
            PipelineState::Done | PipelineState::Failed => Ok(run.state),
        }
    }

    /// Dispatch one layer to the image blender or the text engine.
    pub fn draw_layer(&self, canvas: &mut RgbaImage, item: &CompositeItem) -> CompositeResult<()> {
        tracing::debug!(
            kind = item.kind_name(),
            depth = item.depth,
            scale = item.scale,
            "drawing layer"
        );
        match &item.payload {
            LayerPayload::Image { asset_path } => {
                let src = self.loader.load_raster(asset_path)?;
                blend_image(
                    canvas,
                    &src,
                    item.position,
                    item.scale,
                    item.scale_mode,
                    item.opacity,
                )?;
            }
            LayerPayload::Text {
                text,
                font_id,
                color_hex,
            } => {
                let color = parse_hex_color(color_hex)?;
                let face = self.fonts.face(font_id, FaceOptions::for_scale(item.scale))?;
                draw_text(
                    canvas,
                    &face,
                    text,
                    item.position,
                    TextStyle {
                        color,
                        align: item.align,
                        opacity: item.opacity as f32,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;

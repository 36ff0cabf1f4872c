use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{OutputSize, Position};
use crate::foundation::error::{CompositeError, CompositeResult};

/// Horizontal alignment of text lines relative to their anchor. Ignored for image layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Line starts at the anchor.
    #[default]
    #[serde(alias = "")]
    Left,
    /// Line is centered on the anchor.
    Center,
    /// Line ends at the anchor.
    Right,
}

/// How an image layer's `scale` is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Width and height are both multiplied by `scale`.
    #[default]
    Both,
    /// Width is multiplied by `scale`; height follows the source aspect ratio.
    Width,
}

/// Kind-specific data of a layer.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerPayload {
    /// A raster drawn centered on its anchor.
    Image {
        /// Path handed to the raster loader.
        asset_path: PathBuf,
    },
    /// One or more lines of text; lines are separated by the literal two characters `\n`.
    Text {
        /// Text with optional `\n` line markers.
        text: String,
        /// Font identifier handed to the font resolver.
        font_id: String,
        /// `#RRGGBB` or `#RGB` fill color, parsed at draw time.
        color_hex: String,
    },
}

/// One drawable layer.
///
/// Geometry is stored unresolved (percentages and multipliers) and only turned into pixels once
/// the canvas size is known.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeItem {
    /// Ordering key; lower depths are drawn first.
    pub depth: i32,
    /// Resize factor for images, font size multiplier (of 12pt) for text.
    pub scale: f64,
    /// Blend weight in `[0, 1]`, independent of `scale`.
    pub opacity: f64,
    /// Anchor as a percentage of canvas width/height.
    pub position: Position,
    /// Text line alignment.
    pub align: Align,
    /// Image scaling mode.
    pub scale_mode: ScaleMode,
    /// Image or text data.
    pub payload: LayerPayload,
}

impl CompositeItem {
    fn with_payload(payload: LayerPayload) -> Self {
        Self {
            depth: 0,
            scale: 1.0,
            opacity: 1.0,
            position: Position::default(),
            align: Align::Left,
            scale_mode: ScaleMode::Both,
            payload,
        }
    }

    /// Image layer at depth 0, scale 1, position (0, 0).
    pub fn image(asset_path: impl Into<PathBuf>) -> Self {
        Self::with_payload(LayerPayload::Image {
            asset_path: asset_path.into(),
        })
    }

    /// Text layer at depth 0, scale 1, position (0, 0), left aligned.
    pub fn text(
        text: impl Into<String>,
        font_id: impl Into<String>,
        color_hex: impl Into<String>,
    ) -> Self {
        Self::with_payload(LayerPayload::Text {
            text: text.into(),
            font_id: font_id.into(),
            color_hex: color_hex.into(),
        })
    }

    /// Set the depth.
    pub fn depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the position in percent.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the scale.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the opacity.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Set the image scaling mode.
    pub fn scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    /// `"image"` or `"text"`.
    pub fn kind_name(&self) -> &'static str {
        match self.payload {
            LayerPayload::Image { .. } => "image",
            LayerPayload::Text { .. } => "text",
        }
    }
}

/// Where the background comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundSpec {
    /// Path handed to the raster loader.
    pub asset_path: PathBuf,
}

/// Output naming and optional final resize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputSpec {
    /// Output file name; derived from the configuration name when absent.
    pub file_name: Option<String>,
    /// Final canvas size; applied only when both dimensions are positive.
    pub size: Option<OutputSize>,
}

/// A complete, validated composition description.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionConfig {
    /// Background raster.
    pub background: BackgroundSpec,
    /// Output settings.
    pub output: OutputSpec,
    /// Layers in document order.
    pub layers: Vec<CompositeItem>,
}

impl CompositionConfig {
    /// Configuration with a background and no layers.
    pub fn new(background: impl Into<PathBuf>) -> Self {
        Self {
            background: BackgroundSpec {
                asset_path: background.into(),
            },
            output: OutputSpec::default(),
            layers: Vec::new(),
        }
    }

    /// Append a layer.
    pub fn layer(mut self, item: CompositeItem) -> Self {
        self.layers.push(item);
        self
    }

    /// Set the output file name.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output.file_name = Some(name.into());
        self
    }

    /// Set the final output size.
    pub fn output_size(mut self, width: i64, height: i64) -> Self {
        self.output.size = Some(OutputSize { width, height });
        self
    }

    /// Decode a JSON configuration document.
    pub fn from_json_str(s: &str) -> CompositeResult<Self> {
        let def: ConfigDef =
            serde_json::from_str(s).map_err(|e| CompositeError::config_decode(e.to_string()))?;
        def.try_into()
    }

    /// Decode a JSON configuration document from a reader.
    pub fn from_reader(r: impl Read) -> CompositeResult<Self> {
        let def: ConfigDef =
            serde_json::from_reader(r).map_err(|e| CompositeError::config_decode(e.to_string()))?;
        def.try_into()
    }

    /// Read and decode a JSON configuration file.
    pub fn load(path: &Path) -> CompositeResult<Self> {
        let f = std::fs::File::open(path).map_err(|e| {
            CompositeError::config_decode(format!("open '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f)).map_err(|e| match e {
            CompositeError::ConfigDecode(msg) => {
                CompositeError::config_decode(format!("'{}': {msg}", path.display()))
            }
            other => other,
        })
    }
}

// Wire format. Field names follow the established JSON document layout.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDef {
    pub(crate) bg_img: BgImgDef,
    #[serde(default)]
    pub(crate) composite_item_list: Vec<CompositeItemDef>,
    #[serde(default)]
    pub(crate) output_img: Option<OutputImgDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BgImgDef {
    pub(crate) file_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutputImgDef {
    #[serde(default)]
    pub(crate) file_name: Option<String>,
    #[serde(default)]
    pub(crate) size: Option<OutputSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompositeItemDef {
    pub(crate) common_param: CommonParamDef,
    #[serde(default)]
    pub(crate) specific_param: SpecificParamDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LayerKindDef {
    Image,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommonParamDef {
    #[serde(rename = "type")]
    pub(crate) kind: LayerKindDef,
    #[serde(default)]
    pub(crate) depth: i32,
    #[serde(default = "one")]
    pub(crate) scale: f64,
    #[serde(default)]
    pub(crate) pos: Position,
    #[serde(default)]
    pub(crate) align: Align,
    #[serde(default = "one")]
    pub(crate) opacity: f64,
    #[serde(default)]
    pub(crate) scale_mode: ScaleMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpecificParamDef {
    #[serde(default)]
    pub(crate) file_path: Option<String>,
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) font: Option<String>,
    #[serde(default)]
    pub(crate) color: Option<String>,
}

fn one() -> f64 {
    1.0
}

fn required(field: Option<String>, index: usize, name: &str) -> CompositeResult<String> {
    match field {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CompositeError::config_decode(format!(
            "compositeItemList[{index}].specificParam.{name} is required"
        ))),
    }
}

impl TryFrom<ConfigDef> for CompositionConfig {
    type Error = CompositeError;

    fn try_from(def: ConfigDef) -> CompositeResult<Self> {
        if def.bg_img.file_path.is_empty() {
            return Err(CompositeError::config_decode("bgImg.filePath is required"));
        }

        let layers = def
            .composite_item_list
            .into_iter()
            .enumerate()
            .map(|(i, item)| CompositeItem::from_def(i, item))
            .collect::<CompositeResult<Vec<_>>>()?;

        let output = def.output_img.unwrap_or_default();
        Ok(Self {
            background: BackgroundSpec {
                asset_path: PathBuf::from(def.bg_img.file_path),
            },
            output: OutputSpec {
                file_name: output.file_name.filter(|n| !n.is_empty()),
                size: output.size,
            },
            layers,
        })
    }
}

impl CompositeItem {
    fn from_def(index: usize, def: CompositeItemDef) -> CompositeResult<Self> {
        let CompositeItemDef {
            common_param: c,
            specific_param: s,
        } = def;

        if !c.scale.is_finite() {
            return Err(CompositeError::config_decode(format!(
                "compositeItemList[{index}].commonParam.scale must be finite"
            )));
        }
        if !c.opacity.is_finite() || !(0.0..=1.0).contains(&c.opacity) {
            return Err(CompositeError::config_decode(format!(
                "compositeItemList[{index}].commonParam.opacity must be in [0, 1]"
            )));
        }

        let payload = match c.kind {
            LayerKindDef::Image => LayerPayload::Image {
                asset_path: PathBuf::from(required(s.file_path, index, "filePath")?),
            },
            LayerKindDef::Text => LayerPayload::Text {
                text: s.text.unwrap_or_default(),
                font_id: required(s.font, index, "font")?,
                color_hex: required(s.color, index, "color")?,
            },
        };

        Ok(Self {
            depth: c.depth,
            scale: c.scale,
            opacity: c.opacity,
            position: c.pos,
            align: c.align,
            scale_mode: c.scale_mode,
            payload,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;

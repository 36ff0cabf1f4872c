use std::path::PathBuf;

/// Convenience result type used across layercomp.
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Top-level error taxonomy used by compositing APIs.
///
/// Every variant is fatal to the composition job that produced it; batch runs report them per job.
#[derive(thiserror::Error, Debug)]
pub enum CompositeError {
    /// The configuration document could not be decoded into the layer model.
    #[error("config decode error: {0}")]
    ConfigDecode(String),

    /// A background or layer raster could not be read or decoded.
    #[error("asset load error for '{}': {reason}", path.display())]
    AssetLoad {
        /// Path of the asset as requested by the configuration.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// A color string is not `#RRGGBB` or `#RGB`.
    #[error("invalid color format: \"{0}\"")]
    InvalidColorFormat(String),

    /// No font directory is known for the host operating system.
    #[error("unsupported platform for font lookup: {0}")]
    UnsupportedPlatform(String),

    /// The resolved font file does not exist or cannot be read.
    #[error("font not found: {}", path.display())]
    FontNotFound {
        /// Resolved font file path.
        path: PathBuf,
    },

    /// The font file bytes are not a parseable outline font.
    #[error("font parse error for '{}'", path.display())]
    FontParse {
        /// Font file path.
        path: PathBuf,
    },

    /// A face could not be built from a parsed font.
    #[error("font face creation error: {0}")]
    FontFaceCreation(String),

    /// A raster could not be resized to the requested dimensions.
    #[error("resize error: {0}")]
    Resize(String),

    /// The finished canvas could not be persisted.
    #[error("save error for '{}': {reason}", path.display())]
    Save {
        /// Destination path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Invalid caller-provided data outside the configuration document.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompositeError {
    /// Build a [`CompositeError::ConfigDecode`] value.
    pub fn config_decode(msg: impl Into<String>) -> Self {
        Self::ConfigDecode(msg.into())
    }

    /// Build a [`CompositeError::AssetLoad`] value.
    pub fn asset_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`CompositeError::InvalidColorFormat`] value.
    pub fn invalid_color(input: impl Into<String>) -> Self {
        Self::InvalidColorFormat(input.into())
    }

    /// Build a [`CompositeError::FontFaceCreation`] value.
    pub fn font_face(msg: impl Into<String>) -> Self {
        Self::FontFaceCreation(msg.into())
    }

    /// Build a [`CompositeError::Resize`] value.
    pub fn resize(msg: impl Into<String>) -> Self {
        Self::Resize(msg.into())
    }

    /// Build a [`CompositeError::Save`] value.
    pub fn save(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`CompositeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Return `true` for errors raised while resolving or building a font face.
    pub fn is_font_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform(_)
                | Self::FontNotFound { .. }
                | Self::FontParse { .. }
                | Self::FontFaceCreation(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

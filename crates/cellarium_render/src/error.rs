//! Error types for the rendering and export pipeline.

use thiserror::Error;

/// Main error type for cellarium_render operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Malformed `#RRGGBB` color string
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Pattern name not present in the registry
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// Image encoding errors
    #[error("Image encoding error: {0}")]
    Encoding(#[from] image::ImageError),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON metadata errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for cellarium_render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

impl RenderError {
    /// Creates a new invalid-color error.
    #[must_use]
    pub fn invalid_color<S: Into<String>>(color: S) -> Self {
        Self::InvalidColor(color.into())
    }

    /// Creates a new unknown-pattern error.
    #[must_use]
    pub fn unknown_pattern<S: Into<String>>(name: S) -> Self {
        Self::UnknownPattern(name.into())
    }
}

use thiserror::Error;

/// Errors raised while reading or validating a serialized scene
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid scene: {0}")]
    Invalid(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while rasterizing panels or writing the print artifact
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid font: {0}")]
    Font(String),

    #[error("Failed to write PDF: {0}")]
    Pdf(String),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

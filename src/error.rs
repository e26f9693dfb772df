use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the dataset backend.
///
/// All of these are recoverable: the editor reports them and lets the user retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Item not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Another operation is still running")]
    Busy,
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

/// Errors that can occur while turning a path into a displayable image
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image")]
    Decode(#[from] image::ImageError),
    #[error("Invalid image dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

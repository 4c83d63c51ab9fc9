use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LuckyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open file {}: {source}", path.display())]
    Unopenable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find a video stream in {}: {reason}", path.display())]
    NoVideoStream { path: PathBuf, reason: String },

    #[error("Could not find codec: {codec} (in {})", path.display())]
    UnsupportedCodec { path: PathBuf, codec: String },

    #[error("Super-resolution factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Frame geometry {found:?} does not match store geometry {expected:?}")]
    GeometryMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, LuckyError>;

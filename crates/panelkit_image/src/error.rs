//! Image error types

use thiserror::Error;

/// Errors raised while resolving or decoding a resource image
#[derive(Error, Debug)]
pub enum ImageError {
    /// The resource name does not resolve to anything
    #[error("Image resource not found: {0}")]
    NotFound(String),

    /// Reading the resource failed
    #[error("Failed to read image resource: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Base64 payload was malformed
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Pixel data and dimensions disagree
    #[error("Invalid image dimensions {width}x{height} for {len} bytes")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;

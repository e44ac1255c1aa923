//! Image source types

use std::path::{Path, PathBuf};

/// Where the bytes of a resource image come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Load from a file path
    File(PathBuf),

    /// Load from base64-encoded data
    /// Can optionally include data URI prefix (e.g., "data:image/png;base64,...")
    Base64(String),

    /// Load from raw encoded bytes
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Create a file source
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Parse a resource name into an ImageSource.
    ///
    /// Supported formats:
    /// - `data:image/png;base64,...` - Data URI with base64
    /// - `file:///path/to/image.png` - File path
    /// - anything else - file path, relative names resolved against `root`
    pub fn from_resource_name(name: &str, root: Option<&Path>) -> Self {
        if name.starts_with("data:") {
            Self::Base64(name.to_string())
        } else if let Some(path) = name.strip_prefix("file://") {
            Self::File(PathBuf::from(path))
        } else {
            let path = Path::new(name);
            match root {
                Some(root) if path.is_relative() => Self::File(root.join(path)),
                _ => Self::File(path.to_path_buf()),
            }
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Image format hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

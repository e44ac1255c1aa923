//! Resolving resource names to decoded rasters

use std::io::ErrorKind;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use panelkit_paint::Raster;

use crate::error::{ImageError, Result};
use crate::source::{ImageFormat, ImageSource};

/// Resolves opaque resource names to rasters.
///
/// The cache calls this outside its lock, possibly from several threads.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Raster>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> Result<Raster> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<Raster> {
        self(name)
    }
}

/// Loads resources from the filesystem, relative names resolved against `root`
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Loader without a root; names are used as given
    pub fn unrooted() -> Self {
        Self { root: None }
    }
}

impl ResourceLoader for FileLoader {
    fn load(&self, name: &str) -> Result<Raster> {
        load_source(&ImageSource::from_resource_name(name, self.root.as_deref()))
    }
}

/// Read and decode an image source
pub fn load_source(source: &ImageSource) -> Result<Raster> {
    match source {
        ImageSource::File(path) => {
            let bytes = std::fs::read(path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => ImageError::NotFound(path.display().to_string()),
                _ => ImageError::Io(e),
            })?;
            let hint = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension);
            decode(&bytes, hint)
        }
        ImageSource::Base64(data) => {
            // Strip a data URI prefix if present
            let payload = match data.find("base64,") {
                Some(idx) => &data[idx + "base64,".len()..],
                None => data.as_str(),
            };
            let bytes = STANDARD.decode(payload.trim())?;
            decode(&bytes, None)
        }
        ImageSource::Bytes(bytes) => decode(bytes, None),
    }
}

/// Decode encoded image bytes into an RGBA8 raster
pub fn decode(bytes: &[u8], hint: Option<ImageFormat>) -> Result<Raster> {
    let image = match hint {
        Some(format) => image::load_from_memory_with_format(bytes, format.to_image_format())
            .or_else(|_| image::load_from_memory(bytes))?,
        None => image::load_from_memory(bytes)?,
    };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.into_raw();
    let len = pixels.len();
    Raster::from_rgba(width, height, pixels).ok_or(ImageError::InvalidDimensions {
        width,
        height,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        buffer
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let raster = decode(&encode_png(3, 2), Some(ImageFormat::Png)).unwrap();
        assert_eq!((raster.width(), raster.height()), (3, 2));
        assert_eq!(raster.pixel(2, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_base64_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(encode_png(1, 1)));
        let raster = load_source(&ImageSource::Base64(uri)).unwrap();
        assert_eq!(raster.width(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let loader = FileLoader::new("/definitely/not/here");
        assert!(matches!(
            loader.load("nope.png"),
            Err(ImageError::NotFound(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode(b"not an image", None),
            Err(ImageError::Decode(_))
        ));
    }
}

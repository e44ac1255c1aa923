//! Panelkit Image
//!
//! Resource image loading for panel geometries.
//!
//! # Features
//!
//! - Resolve opaque resource names through a pluggable [`ResourceLoader`]
//! - Decode PNG, JPEG, GIF and BMP into RGBA rasters
//! - A process-wide [`ImageCache`] with mark-and-sweep cache runs
//!
//! # Example
//!
//! ```ignore
//! use panelkit_image::{FileLoader, ImageCache};
//!
//! let cache = ImageCache::new(FileLoader::new("resources"));
//! cache.begin_cache_run();
//! let icon = cache.lookup("icons/ok.png");
//! cache.end_cache_run();
//! ```

mod cache;
mod error;
mod loader;
mod source;

pub use cache::ImageCache;
pub use error::{ImageError, Result};
pub use loader::{decode, load_source, FileLoader, ResourceLoader};
pub use source::{ImageFormat, ImageSource};

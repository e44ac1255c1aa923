//! Panelkit Geometry
//!
//! Drawable primitives for panel elements and the asynchronous render
//! pipeline for geometries whose pixels are expensive to produce.
//!
//! # Features
//!
//! - [`Geometry`] trait with area, image and text geometries
//! - Translate, scale and perspective [`Modifier`]s
//! - [`ElementView`]: an element state painted through its geometries
//! - [`AsyncGeometry`]: frames rendered by a [`Producer`] on a bounded lane
//!   pool owned by a [`RenderContext`], double buffered so paint never waits
//!
//! # Example
//!
//! ```ignore
//! use panelkit_geometry::{AsyncGeometry, RenderConfig, RenderContext};
//!
//! let render = RenderContext::new(&RenderConfig::default())?;
//! let mut radar = AsyncGeometry::new(bounds);
//! radar.set_producer(RadarProducer::default());
//! radar.set_input(sweep);
//! radar.invalidate(&render)?;
//! ```

pub mod buffer;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod heavy;
pub mod image;
pub mod modifier;
mod pool;
pub mod producer;
pub mod render;
pub mod shape;
pub mod text;

#[cfg(test)]
mod test_support;

pub use buffer::DoubleBuffer;
pub use config::{Backpressure, RenderConfig};
pub use element::ElementView;
pub use error::{ConfigError, GeometryError, RenderError, Result};
pub use geometry::{Geometry, Surface};
pub use heavy::{AsyncDescriptor, AsyncGeometry, GeometryId};
pub use image::ImageGeometry;
pub use modifier::{GeometryExt, Modified, Modifier};
pub use pool::Submission;
pub use producer::Producer;
pub use render::{RenderContext, RenderStats};
pub use shape::AreaGeometry;
pub use text::TextGeometry;

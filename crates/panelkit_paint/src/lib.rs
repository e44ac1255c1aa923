//! Panelkit Paint API
//!
//! The drawing vocabulary shared by the host and the screen side of a panel.
//!
//! # Features
//!
//! - Colors, points and rectangles that serialize across the wire
//! - Resolution-independent paths with flattening for a given device scale
//! - Hit-test regions (`Area`) used for touch handling and dirty regions
//! - RGBA rasters for decoded images and offscreen render buffers
//! - Affine and perspective transforms
//! - A recording `PaintContext` bound to one paint device

pub mod area;
pub mod color;
pub mod context;
pub mod path;
pub mod primitives;
pub mod raster;
pub mod transform;

pub use area::{Area, Polygon};
pub use color::Color;
pub use context::{
    DeviceId, FillStyle, Font, GlyphPosition, PaintCommand, PaintContext, StrokeStyle,
};
pub use path::{Path, PathBuilder, PathCommand, Point};
pub use primitives::*;
pub use raster::Raster;
pub use transform::{Perspective, Transform2D};

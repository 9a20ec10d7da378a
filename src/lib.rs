//! Grid-template photo collages: layout selection, per-image transforms,
//! raster compositing and an equivalent HTML/CSS layout description.

pub mod batch;
pub mod catalog;
pub mod collage;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod markup;
pub mod output;
pub mod source;
pub mod style;
pub mod transform;

pub use collage::{
    BuildOptions, Collage, CollageBuilder, Diagnostic, SourceImage, build_collage,
};
pub use error::{Error, Result};
pub use geometry::{CanvasSize, CellRatio, PixelBox};

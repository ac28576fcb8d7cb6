//! # Optic Image
//!
//! Raster handling for visual regression captures: loading and saving PNG
//! screenshots, cropping the captured region out of a full-page shot, and
//! the tolerant pixel comparison that decides whether two captures match.
//!
//! Comparison and diff building are free functions operating on two
//! independently loaded images — neither image "owns" the comparison.

mod compare;
mod geom;
mod raster;

pub use compare::{
    build_diff, compare, compare_rasters, differing_pixels, parse_hex_color, CompareOptions,
    DiffOptions, DEFAULT_DIFF_COLOR, DEFAULT_TOLERANCE,
};
pub use geom::{CropRect, Position, Size};
pub use raster::Image;

// Re-exported so downstream crates can construct rasters without depending
// on the codec crate directly.
pub use image::{Rgba, RgbaImage};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Crop rectangle {rect} exceeds image bounds {size}")]
    CropBounds { rect: CropRect, size: Size },

    #[error("Dimension mismatch: reference {reference}, current {current}")]
    DimensionMismatch { reference: Size, current: Size },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageError>;

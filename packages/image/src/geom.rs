//! Pixel geometry shared across the capture pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Offset from the top-left corner of a coordinate space, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub top: u32,
    pub left: u32,
}

impl Position {
    pub fn new(top: u32, left: u32) -> Self {
        Self { top, left }
    }
}

/// Region of a screenshot to extract.
///
/// Derived from page geometry by the crop calculator; not meant to be
/// assembled by hand elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Whether the rectangle lies fully inside a raster of `size`.
    pub fn fits_within(&self, size: Size) -> bool {
        self.left as u64 + self.width as u64 <= size.width as u64
            && self.top as u64 + self.height as u64 <= size.height as u64
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{},{}", self.width, self.height, self.left, self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_fits_within_bounds() {
        let size = Size::new(20, 20);
        let rect = CropRect {
            top: 1,
            left: 1,
            width: 18,
            height: 18,
        };
        assert!(rect.fits_within(size));
    }

    #[test]
    fn test_rect_touching_edge_fits() {
        let size = Size::new(20, 20);
        let rect = CropRect {
            top: 0,
            left: 0,
            width: 20,
            height: 20,
        };
        assert!(rect.fits_within(size));
    }

    #[test]
    fn test_rect_past_edge_does_not_fit() {
        let size = Size::new(20, 20);
        let rect = CropRect {
            top: 3,
            left: 0,
            width: 20,
            height: 18,
        };
        assert!(!rect.fits_within(size));
    }

    #[test]
    fn test_rect_fit_check_does_not_overflow() {
        let size = Size::new(100, 100);
        let rect = CropRect {
            top: u32::MAX,
            left: 0,
            width: 1,
            height: u32::MAX,
        };
        assert!(!rect.fits_within(size));
    }
}

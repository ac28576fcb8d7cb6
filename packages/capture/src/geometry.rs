//! Page geometry and crop rectangle derivation.

use optic_image::{CropRect, Position, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Geometry the browser reports for one prepared screenshot.
///
/// Produced fresh per capture by the automation layer (which gathers it
/// from in-page script), hence the camelCase wire names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Size of the region the capture selectors cover.
    pub crop_size: Size,
    /// Region offset in document-body coordinates.
    pub location_in_body: Position,
    /// Region offset in viewport coordinates.
    pub location_in_viewport: Position,
    /// Full height of the document body.
    pub body_height: u32,
    /// Whether a text caret may blink inside the region.
    pub can_have_caret: bool,
    /// Opaque coverage diagnostics, forwarded untouched.
    #[serde(default)]
    pub coverage: Option<Value>,
}

/// The element's captured box extends below the captured screenshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Failed to capture the element because it is positioned outside of the captured body. \
     Most probably you are trying to capture an absolute positioned element which does not \
     make body height to expand. To fix this place a tall enough <div> on the page to make \
     body expand.\nElement position: {left}, {top}; size: {width}, {height}. \
     Page screenshot size: {screenshot_width}, {screenshot_height}."
)]
pub struct GeometryError {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub screenshot_width: u32,
    pub screenshot_height: u32,
}

/// Derive the pixel rectangle to crop out of a full-page screenshot.
///
/// When the screenshot is shorter than the document body, the capture did
/// not include the page's scroll extension and viewport coordinates
/// apply; otherwise body coordinates do. Only bottom overflow is checked:
/// width never needs reflow correction in practice.
pub fn crop_rect(image_size: Size, page: &PageGeometry) -> Result<CropRect, GeometryError> {
    let location = if image_size.height < page.body_height {
        page.location_in_viewport
    } else {
        page.location_in_body
    };
    let size = page.crop_size;

    if u64::from(location.top) + u64::from(size.height) > u64::from(image_size.height) {
        return Err(GeometryError {
            left: location.left,
            top: location.top,
            width: size.width,
            height: size.height,
            screenshot_width: image_size.width,
            screenshot_height: image_size.height,
        });
    }

    Ok(CropRect {
        top: location.top,
        left: location.left,
        width: size.width,
        height: size.height,
    })
}

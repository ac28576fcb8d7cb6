//! # Optic Capture
//!
//! Capture orchestration for visual regression states: drive a browser
//! (behind the [`Browser`] capability) through a state-preparation hook,
//! take a full-page screenshot, compute the crop rectangle for the target
//! region, and hand the cropped capture back for comparison against a
//! stored reference.
//!
//! A test runner constructs one [`CaptureSession`] per browser instance
//! and calls [`CaptureSession::capture`] for each declared [`State`];
//! comparison of the captured region lives in `optic-image`.

pub mod browser;
pub mod error;
pub mod geometry;
pub mod model;
pub mod session;

pub use browser::{
    find, ActionSequence, ActionTarget, Browser, BrowserError, CaptureOptions, FindFn,
};
pub use error::{CaptureError, CaptureFailure, CaptureIdentity, HookError};
pub use geometry::{crop_rect, GeometryError, PageGeometry};
pub use model::{HookContext, State, StateHook, Suite, SuiteRef};
pub use session::{CaptureSession, CapturedRegion};

// Re-export the raster side so runners can depend on one crate.
pub use optic_image::{CropRect, Image, Position, Size};

//! Browser capability consumed by capture sessions.
//!
//! The automation layer (WebDriver, CDP, ...) lives behind these traits.
//! A session only needs three things from it: action sequences for hooks
//! to fill, page geometry for the prepared shot, and a full-page
//! screenshot.

use crate::geometry::PageGeometry;
use async_trait::async_trait;
use optic_image::Image;
use thiserror::Error;

/// Failure reported by the automation layer.
#[derive(Error, Debug)]
#[error("Browser error: {0}")]
pub struct BrowserError(pub String);

/// Target of a queued browser action, resolved from a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    selector: String,
}

impl ActionTarget {
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Resolve a selector into an action target.
///
/// Handed to hooks so they can address elements when queueing actions.
pub fn find(selector: &str) -> ActionTarget {
    ActionTarget {
        selector: selector.to_string(),
    }
}

/// Signature of the selector helper passed to hooks.
pub type FindFn = fn(&str) -> ActionTarget;

/// Sequence of browser actions composed by a hook and performed in order.
#[async_trait]
pub trait ActionSequence: Send {
    /// Queue a click on `target`.
    fn click(&mut self, target: &ActionTarget);

    /// Queue keystrokes sent to `target`.
    fn send_keys(&mut self, target: &ActionTarget, keys: &str);

    /// Queue a fixed pause.
    fn wait(&mut self, millis: u64);

    /// Execute the queued actions against the page.
    async fn perform(&mut self) -> Result<(), BrowserError>;
}

/// Options forwarded to the browser when preparing a screenshot.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// Ask the page to report coverage diagnostics with its geometry.
    pub coverage: bool,
}

/// One automated browser instance.
///
/// Single use at a time: a session never issues concurrent calls against
/// its browser.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Identity used in failure reports.
    fn id(&self) -> &str;

    /// Start an empty action sequence.
    fn create_action_sequence(&self) -> Box<dyn ActionSequence>;

    /// Prepare the page for a shot of `selectors` and report its geometry.
    async fn prepare_screenshot(
        &self,
        selectors: &[String],
        opts: &CaptureOptions,
    ) -> Result<PageGeometry, BrowserError>;

    /// Take a full-page screenshot.
    async fn capture_fullscreen_image(&self) -> Result<Image, BrowserError>;
}

//! Capture session: one capture for one state on one browser.

use crate::browser::{find, Browser, CaptureOptions};
use crate::error::{CaptureError, CaptureFailure, CaptureIdentity};
use crate::geometry::crop_rect;
use crate::model::{HookContext, State, StateHook};
use optic_image::Image;
use serde_json::Value;
use tracing::debug;

/// Region extracted for one state, plus per-capture metadata.
#[derive(Debug)]
pub struct CapturedRegion {
    pub image: Image,
    pub can_have_caret: bool,
    pub coverage: Option<Value>,
}

/// Coordinates one capture pipeline against one browser instance.
///
/// Stages run strictly in order, each stage's output feeding the next:
/// hook, page preparation, screenshot, crop. `capture` borrows the
/// session mutably, so overlapping captures on one session do not
/// compile; independent sessions run concurrently without sharing state.
pub struct CaptureSession<B> {
    browser: B,
}

impl<B: Browser> CaptureSession<B> {
    pub fn new(browser: B) -> Self {
        Self { browser }
    }

    pub fn browser_id(&self) -> &str {
        self.browser.id()
    }

    /// Run a state-preparation hook and perform the sequence it builds.
    ///
    /// A hook fault is converted into the error channel at this single
    /// boundary; the sequence is only performed when the hook succeeds.
    pub async fn run_hook(
        &self,
        hook: &StateHook,
        context: &mut HookContext,
    ) -> Result<(), CaptureError> {
        let mut sequence = self.browser.create_action_sequence();
        if let Err(cause) = hook(context, &mut *sequence, find) {
            return Err(CaptureError::Hook(cause));
        }
        sequence.perform().await?;
        Ok(())
    }

    /// Capture `state`: run its hook, prepare the page, take a full-page
    /// screenshot, and crop it to the target region.
    ///
    /// Any stage failure short-circuits the rest. State-scoped failures
    /// surface enriched with suite/state/browser identity — exactly once,
    /// here at the outer boundary; other failures pass through untouched.
    pub async fn capture(
        &mut self,
        state: &State,
        opts: &CaptureOptions,
    ) -> Result<CapturedRegion, CaptureFailure> {
        let result = self.capture_inner(state, opts).await;
        result.map_err(|error| CaptureFailure::enrich(error, self.identity_for(state)))
    }

    async fn capture_inner(
        &self,
        state: &State,
        opts: &CaptureOptions,
    ) -> Result<CapturedRegion, CaptureError> {
        let mut context = HookContext::default();

        debug!(state = %state.name(), "running state hook");
        self.run_hook(state.hook(), &mut context).await?;

        debug!(state = %state.name(), "preparing page for screenshot");
        let page = self
            .browser
            .prepare_screenshot(state.capture_selectors(), opts)
            .await?;

        debug!(state = %state.name(), "capturing full-page screenshot");
        let screenshot = self.browser.capture_fullscreen_image().await?;

        let rect = crop_rect(screenshot.size(), &page)?;
        let image = screenshot.crop(rect)?;

        Ok(CapturedRegion {
            image,
            can_have_caret: page.can_have_caret,
            coverage: page.coverage,
        })
    }

    fn identity_for(&self, state: &State) -> CaptureIdentity {
        CaptureIdentity {
            suite_id: state.suite().id.clone(),
            suite_name: state.suite().name.clone(),
            state_name: state.name().to_string(),
            browser_id: self.browser.id().to_string(),
        }
    }
}

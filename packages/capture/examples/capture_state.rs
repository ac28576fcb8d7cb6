//! Example: capture a declared state with a stub browser, then compare
//! two captures and render a diff for the mismatch.

use async_trait::async_trait;
use optic_capture::{
    ActionSequence, ActionTarget, Browser, BrowserError, CaptureOptions, CaptureSession,
    PageGeometry, StateHook, Suite,
};
use optic_image::{
    build_diff, compare, CompareOptions, DiffOptions, Image, Position, Rgba, RgbaImage, Size,
};
use std::sync::Arc;
use tempfile::tempdir;

/// Stand-in automation layer that renders a synthetic page: a light
/// background with one accent-colored "button".
struct StubBrowser {
    id: String,
    accent: Rgba<u8>,
}

struct StubSequence;

#[async_trait]
impl ActionSequence for StubSequence {
    fn click(&mut self, target: &ActionTarget) {
        println!("queued click on {}", target.selector());
    }

    fn send_keys(&mut self, target: &ActionTarget, keys: &str) {
        println!("queued keys {:?} for {}", keys, target.selector());
    }

    fn wait(&mut self, millis: u64) {
        println!("queued {millis}ms pause");
    }

    async fn perform(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[async_trait]
impl Browser for StubBrowser {
    fn id(&self) -> &str {
        &self.id
    }

    fn create_action_sequence(&self) -> Box<dyn ActionSequence> {
        Box::new(StubSequence)
    }

    async fn prepare_screenshot(
        &self,
        _selectors: &[String],
        _opts: &CaptureOptions,
    ) -> Result<PageGeometry, BrowserError> {
        Ok(PageGeometry {
            crop_size: Size::new(64, 32),
            location_in_body: Position::new(16, 16),
            location_in_viewport: Position::new(16, 16),
            body_height: 240,
            can_have_caret: false,
            coverage: None,
        })
    }

    async fn capture_fullscreen_image(&self) -> Result<Image, BrowserError> {
        let accent = self.accent;
        Ok(Image::from_rgba(RgbaImage::from_fn(320, 240, |x, y| {
            if (16..80).contains(&x) && (16..48).contains(&y) {
                accent
            } else {
                Rgba([250, 250, 250, 255])
            }
        })))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let reference_path = dir.path().join("reference.png");
    let current_path = dir.path().join("current.png");
    let diff_path = dir.path().join("diff.png");

    let mut suite = Suite::new("1", "button");
    let hook: StateHook = Arc::new(|_ctx, sequence, find| {
        sequence.click(&find("#button"));
        Ok(())
    });
    suite.add_state("pressed", vec!["#button".to_string()], hook);
    let state = &suite.states()[0];

    // First run: the page as designed.
    let mut session = CaptureSession::new(StubBrowser {
        id: "stub-1".to_string(),
        accent: Rgba([40, 90, 200, 255]),
    });
    let region = session.capture(state, &CaptureOptions::default()).await?;
    println!("captured {} region for `{}`", region.image.size(), state.name());
    region.image.save(&reference_path).await?;

    // Second run: the button color regressed.
    let mut session = CaptureSession::new(StubBrowser {
        id: "stub-2".to_string(),
        accent: Rgba([200, 40, 40, 255]),
    });
    let region = session.capture(state, &CaptureOptions::default()).await?;
    region.image.save(&current_path).await?;

    let equal = compare(&reference_path, &current_path, &CompareOptions::default()).await?;
    println!("captures equal: {equal}");

    if !equal {
        build_diff(&DiffOptions::new(&reference_path, &current_path, &diff_path)).await?;
        println!("diff written to {}", diff_path.display());
    }

    Ok(())
}

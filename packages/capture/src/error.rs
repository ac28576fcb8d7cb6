//! Capture failure taxonomy and identity enrichment.

use crate::browser::BrowserError;
use crate::geometry::GeometryError;
use optic_image::ImageError;
use std::fmt;
use thiserror::Error;

/// Cause raised by a state-preparation hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Failure raised inside the capture pipeline.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The hook faulted while composing the action sequence.
    #[error("Error while executing callback")]
    Hook(#[source] HookError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl CaptureError {
    /// Whether the failure is scoped to the state being captured and
    /// should carry suite/state/browser identity.
    pub fn is_state_scoped(&self) -> bool {
        matches!(self, CaptureError::Hook(_) | CaptureError::Geometry(_))
    }
}

/// Identity of the capture a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureIdentity {
    pub suite_id: String,
    pub suite_name: String,
    pub state_name: String,
    pub browser_id: String,
}

/// A capture-pipeline failure as surfaced to the runner.
///
/// Built once at the capture boundary and never modified afterwards:
/// state-scoped errors carry the identity of the originating
/// suite/state/browser, all other kinds pass through without one.
#[derive(Debug)]
pub struct CaptureFailure {
    pub error: CaptureError,
    pub identity: Option<CaptureIdentity>,
}

impl CaptureFailure {
    pub(crate) fn enrich(error: CaptureError, identity: CaptureIdentity) -> Self {
        let identity = error.is_state_scoped().then_some(identity);
        Self { error, identity }
    }
}

impl fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(id) => write!(
                f,
                "state {} in suite {} failed on browser {}: {}",
                id.state_name, id.suite_name, id.browser_id, self.error
            ),
            None => self.error.fmt(f),
        }
    }
}

impl std::error::Error for CaptureFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CaptureIdentity {
        CaptureIdentity {
            suite_id: "0".to_string(),
            suite_name: "header".to_string(),
            state_name: "hovered".to_string(),
            browser_id: "firefox".to_string(),
        }
    }

    #[test]
    fn test_state_scoped_errors_are_enriched() {
        let failure = CaptureFailure::enrich(CaptureError::Hook("boom".into()), identity());
        assert_eq!(failure.identity, Some(identity()));
        assert_eq!(
            failure.to_string(),
            "state hovered in suite header failed on browser firefox: \
             Error while executing callback"
        );
    }

    #[test]
    fn test_browser_errors_pass_through_unenriched() {
        let failure = CaptureFailure::enrich(
            CaptureError::Browser(BrowserError("connection lost".to_string())),
            identity(),
        );
        assert!(failure.identity.is_none());
        assert_eq!(failure.to_string(), "Browser error: connection lost");
    }
}

//! Open/closed state of the cart overlay panel.
//!
//! The panel opens from the header icon, closes from its close button, the
//! overlay backdrop, "Continue Shopping" and Escape. Adding a product asks the
//! panel to open after a short delay so the visitor sees the new row without
//! an abrupt jump.
//!
//! A pending auto-open is a plain spawned task. With
//! [`AutoOpenPolicy::FireAndForget`] a manual close does not cancel it, so the
//! panel reopens when the delay elapses. [`AutoOpenPolicy::CancelOnClose`]
//! aborts pending opens whenever the panel is closed.

use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What happens to a scheduled auto-open when the panel is closed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoOpenPolicy {
    /// The scheduled open always fires.
    #[default]
    FireAndForget,
    /// Closing the panel cancels every scheduled open.
    CancelOnClose,
}

/// Error parsing an [`AutoOpenPolicy`].
#[derive(Debug, Error)]
#[error("unknown auto-open policy '{0}' (expected 'fire-and-forget' or 'cancel-on-close')")]
pub struct ParsePolicyError(String);

impl FromStr for AutoOpenPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire-and-forget" => Ok(Self::FireAndForget),
            "cancel-on-close" => Ok(Self::CancelOnClose),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Panel controls exposed to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelAction {
    /// Header cart icon.
    Toggle,
    Open,
    /// Close button.
    Close,
    /// Click on the backdrop outside the panel.
    Overlay,
    /// "Continue Shopping" button in the footer.
    Continue,
    Escape,
}

/// Shared handle to one visitor's cart panel.
///
/// Clones refer to the same panel.
#[derive(Debug, Clone)]
pub struct CartPanel {
    inner: Arc<PanelInner>,
}

#[derive(Debug)]
struct PanelInner {
    state: watch::Sender<bool>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    policy: AutoOpenPolicy,
}

impl CartPanel {
    /// Create a closed panel.
    #[must_use]
    pub fn new(policy: AutoOpenPolicy) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(PanelInner {
                state,
                pending: Mutex::new(Vec::new()),
                policy,
            }),
        }
    }

    #[must_use]
    pub fn policy(&self) -> AutoOpenPolicy {
        self.inner.policy
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.inner.state.borrow()
    }

    /// Receive every open/closed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.state.subscribe()
    }

    pub fn open(&self) {
        self.inner.set(true);
    }

    pub fn close(&self) {
        if self.inner.policy == AutoOpenPolicy::CancelOnClose {
            self.inner.cancel_pending();
        }
        self.inner.set(false);
    }

    /// "Continue Shopping" from the footer; same as closing.
    pub fn continue_shopping(&self) {
        self.close();
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Apply a page control. Returns the resulting open state.
    pub fn apply(&self, action: PanelAction) -> bool {
        match action {
            PanelAction::Toggle => self.toggle(),
            PanelAction::Open => self.open(),
            PanelAction::Close | PanelAction::Overlay => self.close(),
            PanelAction::Continue => self.continue_shopping(),
            PanelAction::Escape => {
                if self.is_open() {
                    self.close();
                }
            }
        }
        self.is_open()
    }

    /// Open the panel once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_open(&self, delay: Duration) {
        let panel: Weak<PanelInner> = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = panel.upgrade() {
                tracing::debug!("Auto-opening cart panel");
                inner.set(true);
            }
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(task);
    }

    /// Number of scheduled opens that have not fired yet.
    #[must_use]
    pub fn pending_opens(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl PanelInner {
    fn set(&self, open: bool) {
        self.state.send_if_modified(|current| {
            if *current == open {
                false
            } else {
                *current = open;
                true
            }
        });
    }

    fn cancel_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

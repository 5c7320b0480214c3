//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use crate::config::StorefrontConfig;
use crate::widgets::PageWidgets;

/// Maximum number of visitors whose widget state is kept in memory.
const MAX_VISITORS: u64 = 10_000;

/// Widget state of a visitor who has been idle this long is dropped.
const VISITOR_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, to each visitor's live page widgets and to the lock that
/// runs one session's requests one at a time.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    widgets: Cache<String, Arc<PageWidgets>>,
    session_locks: Cache<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let widgets = Cache::builder()
            .max_capacity(MAX_VISITORS)
            .time_to_idle(VISITOR_IDLE_TIMEOUT)
            .build();
        let session_locks = Cache::builder()
            .max_capacity(MAX_VISITORS)
            .time_to_idle(VISITOR_IDLE_TIMEOUT)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                widgets,
                session_locks,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the page widgets of `visitor`, creating closed ones on first use.
    pub async fn widgets(&self, visitor: &str) -> Arc<PageWidgets> {
        let policy = self.inner.config.auto_open_policy;
        self.inner
            .widgets
            .get_with(visitor.to_string(), async move {
                Arc::new(PageWidgets::new(policy))
            })
            .await
    }

    /// Get the lock serializing requests of the session `session_id`.
    pub async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.inner
            .session_locks
            .get_with(session_id.to_string(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

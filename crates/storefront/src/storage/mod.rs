//! Key-value storage slots behind the cart.
//!
//! The cart talks to two slots with the same shape: a durable one that keeps
//! the cart between page loads, and a session-scoped one used only to hand the
//! cart to the checkout page. Both are string-keyed and string-valued, so the
//! stored payload is exactly the JSON text a browser would keep.
//!
//! # Backends
//!
//! - [`SessionStorage`] - the visitor's tower-sessions session (web binary)
//! - [`MemoryStorage`] - process-local map with an optional byte quota (tests)

mod memory;
mod session;

pub use memory::MemoryStorage;
pub use session::SessionStorage;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the value would exceed the backend's size limit.
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The backend is disabled or unusable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The session layer failed to load or record the value.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// A string key-value slot.
///
/// Implementations must be cheap to share; the cart store holds them behind
/// `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Succeeds when the key is absent.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

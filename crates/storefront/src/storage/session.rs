//! Storage backed by the visitor's tower-sessions session.
//!
//! The session cookie scopes the slot to one browser, and the session store
//! keeps it across page loads, so the session stands in for the browser's own
//! local storage.

use async_trait::async_trait;
use tower_sessions::Session;

use super::{Storage, StorageError};

/// A [`Storage`] slot living inside a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Storage for SessionStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove_value(key).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_round_trip_through_session() {
        let storage = SessionStorage::new(session());
        storage
            .set_item("serenya_cart", "[]".to_string())
            .await
            .unwrap();
        assert_eq!(
            storage.get_item("serenya_cart").await.unwrap().as_deref(),
            Some("[]")
        );

        storage.remove_item("serenya_cart").await.unwrap();
        assert_eq!(storage.get_item("serenya_cart").await.unwrap(), None);
    }
}

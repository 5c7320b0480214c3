//! Stable per-visitor identifier kept in the session.

use tower_sessions::Session;
use uuid::Uuid;

/// Session key holding the visitor id.
pub const VISITOR_ID_KEY: &str = "visitor_id";

/// Get the visitor id from the session, assigning a new one on first visit.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn visitor_id(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(id) = session.get::<String>(VISITOR_ID_KEY).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(VISITOR_ID_KEY, &id).await?;
    tracing::debug!(visitor = %id, "Assigned visitor id");
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_visitor_id_is_sticky() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let first = visitor_id(&session).await.unwrap();
        let second = visitor_id(&session).await.unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }
}

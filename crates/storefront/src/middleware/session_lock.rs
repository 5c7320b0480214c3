//! One request at a time per session.
//!
//! Cart handlers load the cart from the session, change it and write it
//! back, and the session layer stores the record once the handler returns.
//! Two requests of the same browser running side by side would each start
//! from the same snapshot and the later save would drop the other's change.
//! This middleware sits outside the session layer and holds a per-session
//! lock until the inner response (session save included) is complete.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// Value of the session cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Middleware that serializes requests sharing a session cookie.
///
/// Requests without a session cookie start a fresh session and cannot race
/// with anything, so they pass straight through.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session_id) = session_cookie(request.headers()).map(str::to_string) else {
        return next.run(request).await;
    };

    let lock = state.session_lock(&session_id).await;
    let _guard = lock.lock().await;
    next.run(request).await
}

//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing, one span per request)
//! 3. Request ID (add unique ID to each request)
//! 4. Session lock (one request at a time per session cookie)
//! 5. Session layer (tower-sessions with in-memory store)

pub mod request_id;
pub mod session;
pub mod session_lock;
pub mod visitor;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware, request_span};
pub use session::create_session_layer;
pub use session_lock::session_lock_middleware;
pub use visitor::visitor_id;

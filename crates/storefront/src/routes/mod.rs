//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (cart panel + mobile menu)
//! GET  /health                 - Health check
//! GET  /checkout               - Checkout summary from the hand-off
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart/events            - Panel open/closed state (SSE)
//! POST /cart/add               - Add to cart (returns panel, triggers cart-updated)
//! POST /cart/increase          - +1 for an item
//! POST /cart/decrease          - -1 for an item, removing it at zero
//! POST /cart/remove            - Remove an item
//! POST /cart/clear             - Empty the cart
//! POST /cart/panel/{action}    - open | close | toggle | overlay | continue | escape
//! POST /cart/checkout          - Write the hand-off and redirect
//!
//! # Mobile menu (HTMX fragment)
//! POST /menu/{event}           - icon | close | overlay | link | escape
//!
//! # JSON API
//! GET  /api/cart               - Cart contents, count and total
//! POST /api/cart/items         - Add a product
//! ```

pub mod api;
pub mod cart;
pub mod menu;
pub mod pages;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    create_session_layer, request_id_middleware, request_span, session_lock_middleware,
};
use crate::state::AppState;

/// Directory of static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/events", get(cart::events))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/panel/{action}", post(cart::panel))
        .route("/checkout", post(cart::checkout))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(api::get_cart))
        .route("/cart/items", post(api::add_item))
}

/// Create all page and fragment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/checkout", get(pages::checkout))
        .route("/menu/{event}", post(menu::apply))
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_lock_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

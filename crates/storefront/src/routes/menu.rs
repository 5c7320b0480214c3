//! Mobile menu route handlers.
//!
//! Each control posts its event and swaps in the re-rendered menu. The
//! `menu-changed` trigger lets the page toggle the body scroll lock, which
//! sits outside the swapped fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::{AppendHeaders, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::visitor_id;
use crate::state::AppState;
use crate::widgets::{MenuEvent, MenuMarkers, MobileMenu};

/// Mobile menu fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/mobile_menu.html")]
pub struct MobileMenuTemplate {
    pub menu: MenuMarkers,
}

/// `HX-Trigger` payload announcing the new menu state.
fn menu_trigger(menu: MobileMenu) -> String {
    format!(r#"{{"menu-changed":{{"open":{}}}}}"#, menu.is_open())
}

/// Apply a menu event (HTMX).
#[instrument(skip(state, session))]
pub async fn apply(
    State(state): State<AppState>,
    session: Session,
    event: std::result::Result<Path<MenuEvent>, PathRejection>,
) -> Result<Response> {
    let Path(event) = event?;
    let visitor = visitor_id(&session).await?;
    let menu = state.widgets(&visitor).await.apply_menu(event);
    tracing::debug!(?event, open = menu.is_open(), "Menu event");

    Ok((
        AppendHeaders([("HX-Trigger", menu_trigger(menu))]),
        MobileMenuTemplate {
            menu: menu.markers(),
        },
    )
        .into_response())
}

//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler restores the visitor's cart from the session, applies one
//! operation and answers with the re-rendered panel fragment. Successful
//! mutations also emit `HX-Trigger: cart-updated` so the header badge
//! refreshes itself.

use std::convert::Infallible;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, StatusCode},
    response::{
        AppendHeaders, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::{Deserialize, Deserializer};
use serenya_core::{ItemId, NewLineItem, Price};
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, CartView, CheckoutOutcome};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::visitor_id;
use crate::state::AppState;
use crate::storage::{SessionStorage, Storage};
use crate::widgets::{PageWidgets, PanelAction};

/// Event name HTMX listens for to refresh the badge.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// SSE event carrying the panel state (`open` or `closed`).
pub const PANEL_EVENT: &str = "panel";

// =============================================================================
// Templates
// =============================================================================

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
    pub panel_open: bool,
}

impl CartPanelTemplate {
    fn new(cart: CartView, widgets: &PageWidgets) -> Self {
        Self {
            cart,
            panel_open: widgets.panel.is_open(),
        }
    }
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart: CartView,
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub image: String,
    pub color: String,
    pub price: Price,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub quantity: Option<u32>,
}

/// A cleared number input posts `quantity=`; treat it like a missing field.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl AddToCartForm {
    fn into_item(self) -> NewLineItem {
        NewLineItem {
            id: ItemId::from_form_value(&self.id),
            name: self.name,
            image: self.image,
            color: self.color,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Form naming one cart row.
#[derive(Debug, Deserialize)]
pub struct ItemForm {
    pub id: String,
}

// =============================================================================
// Store Helpers
// =============================================================================

/// Restore the visitor's cart and look up their page widgets.
///
/// Both storage slots live in the session: the durable cart key and the
/// checkout hand-off keys never collide.
pub(crate) async fn open_store(
    state: &AppState,
    session: &Session,
) -> Result<(CartStore, Arc<PageWidgets>)> {
    let visitor = visitor_id(session).await?;
    let widgets = state.widgets(&visitor).await;

    let storage: Arc<dyn Storage> = Arc::new(SessionStorage::new(session.clone()));
    let (store, outcome) =
        CartStore::restore(Arc::clone(&storage), storage, state.config().cart.clone()).await;
    tracing::trace!(?outcome, "Cart restored");

    Ok((store.with_panel(widgets.panel.clone()), widgets))
}

/// Wrap a panel fragment with the badge refresh trigger.
fn updated(template: CartPanelTemplate) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        template,
    )
        .into_response()
}

#[derive(Debug, Clone, Copy)]
enum ItemAction {
    Increase,
    Decrease,
    Remove,
}

async fn apply_item(
    state: &AppState,
    session: &Session,
    raw_id: &str,
    action: ItemAction,
) -> Result<Response> {
    let (mut store, widgets) = open_store(state, session).await?;
    let id = ItemId::from_form_value(raw_id);

    let update = match action {
        ItemAction::Increase => store.increase_quantity(&id).await,
        ItemAction::Decrease => store.decrease_quantity(&id).await,
        ItemAction::Remove => store.remove_item(&id).await,
    };

    Ok(match update {
        Some(update) => updated(CartPanelTemplate::new(update.view, &widgets)),
        None => {
            tracing::debug!(item = %id, ?action, "Ignoring unknown cart item");
            CartPanelTemplate::new(store.view(), &widgets).into_response()
        }
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Cart panel fragment.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartPanelTemplate> {
    let (store, widgets) = open_store(&state, &session).await?;
    Ok(CartPanelTemplate::new(store.view(), &widgets))
}

/// Cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let (store, _) = open_store(&state, &session).await?;
    Ok(CartCountTemplate { cart: store.view() })
}

/// Add item to cart (HTMX).
///
/// The panel opens on its own once the auto-open delay has passed; the
/// returned fragment shows it in whatever state it is in right now.
#[instrument(skip(state, session, form), fields(item = %form.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let (mut store, widgets) = open_store(&state, &session).await?;
    add_breadcrumb("cart", "Added product", Some(&[("item", form.id.as_str())]));

    let update = store.add_product(form.into_item()).await;
    Ok(updated(CartPanelTemplate::new(update.view, &widgets)))
}

/// Add one unit of an item (HTMX).
#[instrument(skip(state, session))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    apply_item(&state, &session, &form.id, ItemAction::Increase).await
}

/// Remove one unit of an item, dropping the row at zero (HTMX).
#[instrument(skip(state, session))]
pub async fn decrease(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    apply_item(&state, &session, &form.id, ItemAction::Decrease).await
}

/// Remove an item (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    apply_item(&state, &session, &form.id, ItemAction::Remove).await
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    let (mut store, widgets) = open_store(&state, &session).await?;
    add_breadcrumb("cart", "Cleared cart", None);

    let update = store.clear_cart().await;
    Ok(updated(CartPanelTemplate::new(update.view, &widgets)))
}

/// Open, close or toggle the panel (HTMX).
#[instrument(skip(state, session))]
pub async fn panel(
    State(state): State<AppState>,
    session: Session,
    action: std::result::Result<Path<PanelAction>, PathRejection>,
) -> Result<CartPanelTemplate> {
    let Path(action) = action?;
    let (store, widgets) = open_store(&state, &session).await?;
    let open = widgets.panel.apply(action);
    tracing::debug!(?action, open, "Panel action");
    Ok(CartPanelTemplate::new(store.view(), &widgets))
}

/// Hand the cart to the checkout page and navigate there.
///
/// HTMX requests get an `HX-Redirect`, plain form posts a `303 See Other`.
/// An empty cart, or a hand-off that could not be written, answers
/// `204 No Content` and the page stays where it is.
#[instrument(skip(state, session, headers))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let (store, _) = open_store(&state, &session).await?;

    match store.checkout().await {
        CheckoutOutcome::Proceed { location } => {
            add_breadcrumb("cart", "Proceeded to checkout", None);
            if headers.contains_key("HX-Request") {
                Ok((StatusCode::OK, AppendHeaders([("HX-Redirect", location)])).into_response())
            } else {
                Ok(Redirect::to(&location).into_response())
            }
        }
        CheckoutOutcome::Empty | CheckoutOutcome::HandoffFailed => {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Stream the panel's open state as Server-Sent Events.
///
/// The current state is sent first, then every change, including the
/// delayed open scheduled by an add.
#[instrument(skip(state, session))]
pub async fn events(
    State(state): State<AppState>,
    session: Session,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let visitor = visitor_id(&session).await?;
    let widgets = state.widgets(&visitor).await;

    let stream = WatchStream::new(widgets.panel.subscribe()).map(|open| {
        let data = if open { "open" } else { "closed" };
        Ok(Event::default().event(PANEL_EVENT).data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::view::dom;

    #[test]
    fn test_add_form_keeps_id_kind() {
        let form = AddToCartForm {
            id: "n:101".to_string(),
            name: "Chiffon Hijab".to_string(),
            image: "/static/img/chiffon.jpg".to_string(),
            color: "Rose".to_string(),
            price: Price::from_rupees(1299),
            quantity: None,
        };
        let item = form.into_item();
        assert_eq!(item.id, ItemId::from(101));
        assert_eq!(item.quantity, None);
    }

    #[test]
    fn test_add_form_blank_quantity() {
        let form = |quantity: &str| {
            serde_json::from_value::<AddToCartForm>(serde_json::json!({
                "id": "s:A",
                "name": "Jersey",
                "image": "/static/img/jersey.jpg",
                "color": "Ivory",
                "price": "300",
                "quantity": quantity,
            }))
        };
        assert_eq!(form("").unwrap().quantity, None);
        assert_eq!(form(" 3 ").unwrap().quantity, Some(3));
        assert!(form("lots").is_err());
    }

    #[test]
    fn test_panel_fragment_markup() {
        let template = CartPanelTemplate {
            cart: CartView::empty("Rs."),
            panel_open: true,
        };
        let html = template.render().unwrap_or_default();
        assert!(html.contains(r#"class="cart-overlay active" id="cartOverlay""#));
        for id in [dom::COUNT, dom::CONTENT, dom::EMPTY, dom::CLOSE] {
            assert!(html.contains(&format!(r#"id="{id}""#)), "missing #{id}");
        }
        assert!(html.contains("0 items in cart"));
        assert!(!html.contains(r#"id="cartFooter""#));
    }

    #[test]
    fn test_badge_hidden_when_empty() {
        let template = CartCountTemplate {
            cart: CartView::empty("Rs."),
        };
        let html = template.render().unwrap_or_default();
        assert!(html.contains(&format!(r#"id="{}""#, dom::BADGE)));
        assert!(html.contains("display: none;"));
    }
}

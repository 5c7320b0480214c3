//! Page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use serenya_core::{ItemId, Price};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::open_store;
use crate::cart::view::money;
use crate::cart::{CartView, CheckoutHandoff};
use crate::error::Result;
use crate::state::AppState;
use crate::storage::SessionStorage;
use crate::widgets::MenuMarkers;

/// A product card on the home page.
#[derive(Debug, Clone)]
pub struct ProductCard {
    /// Form value of the product id.
    pub handle: String,
    pub name: String,
    pub image: String,
    pub color: String,
    /// Price with currency label.
    pub price: String,
    /// Price as posted back by the add form.
    pub raw_price: String,
}

/// Featured products: (id, name, image, color, price in rupees).
const FEATURED: &[(&str, &str, &str, &str, u32)] = &[
    ("101", "Chiffon Hijab", "/static/img/chiffon-rose.jpg", "Dusty Rose", 1299),
    ("102", "Jersey Hijab", "/static/img/jersey-sage.jpg", "Sage", 1499),
    ("103", "Modal Hijab", "/static/img/modal-sand.jpg", "Sand", 1750),
    ("silk-satin-noir", "Silk Satin Hijab", "/static/img/satin-noir.jpg", "Noir", 2450),
];

fn featured(currency: &str) -> Vec<ProductCard> {
    FEATURED
        .iter()
        .map(|&(id, name, image, color, rupees)| {
            let price = Price::from_rupees(rupees);
            ProductCard {
                handle: ItemId::from_form_value(id).to_form_value(),
                name: name.to_string(),
                image: image.to_string(),
                color: color.to_string(),
                price: money(price.amount(), currency),
                raw_price: price.amount().to_string(),
            }
        })
        .collect()
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCard>,
    pub cart: CartView,
    pub panel_open: bool,
    pub menu: MenuMarkers,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub summary: Option<CartView>,
    pub total: String,
}

/// Display home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let (store, widgets) = open_store(&state, &session).await?;

    Ok(HomeTemplate {
        products: featured(&store.settings().currency),
        cart: store.view(),
        panel_open: widgets.panel.is_open(),
        menu: widgets.menu().markers(),
    })
}

/// Display the checkout summary handed over by the cart.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
) -> Result<CheckoutTemplate> {
    let currency = &state.config().cart.currency;
    let storage = SessionStorage::new(session);

    Ok(match CheckoutHandoff::read(&storage).await {
        Some(handoff) => CheckoutTemplate {
            summary: Some(CartView::build(&handoff.cart, currency)),
            total: money(handoff.total, currency),
        },
        None => CheckoutTemplate {
            summary: None,
            total: money(rust_decimal::Decimal::ZERO, currency),
        },
    })
}

//! Integration tests for the SereNya storefront.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, so no
//! server or network is needed:
//!
//! ```bash
//! cargo test -p serenya-integration-tests
//! ```
//!
//! [`TestClient`] plays the browser: it keeps the session cookie between
//! requests so cart state carries over exactly as it would across page loads.

use std::sync::Mutex;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serenya_storefront::config::StorefrontConfig;
use serenya_storefront::routes;
use serenya_storefront::state::AppState;
use tower::ServiceExt;

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of header `name`, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

/// In-process client with a one-cookie jar.
pub struct TestClient {
    app: Router,
    cookie: Mutex<Option<String>>,
}

impl TestClient {
    /// Build the application with `config`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_app(routes::app(AppState::new(config)))
    }

    /// Wrap an already built router.
    #[must_use]
    pub const fn with_app(app: Router) -> Self {
        Self {
            app,
            cookie: Mutex::new(None),
        }
    }

    /// A second browser against the same application: same state, no cookie.
    #[must_use]
    pub fn other_browser(&self) -> Self {
        Self::with_app(self.app.clone())
    }

    /// Forget the session cookie.
    pub fn clear_cookies(&self) {
        *self.cookie.lock().expect("cookie jar poisoned") = None;
    }

    /// Send a request, attaching and updating the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        let cookie = self.cookie();
        if let Some(cookie) = cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("invalid cookie header"),
            );
        }

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().to_string();
            *self.cookie.lock().expect("cookie jar poisoned") = Some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(get_request(path)).await
    }

    /// `POST path` with a url-encoded form.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(path, form)).await
    }

    /// `POST path` with a url-encoded form, as HTMX sends it.
    pub async fn htmx_post(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let mut request = form_request(path, form);
        request
            .headers_mut()
            .insert("HX-Request", "true".parse().expect("valid header"));
        self.send(request).await
    }

    /// `POST path` with a JSON body.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Current session cookie (`name=value`), if any.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().expect("cookie jar poisoned").clone()
    }
}

/// Build a `GET` request.
///
/// # Panics
///
/// Panics if `path` is not a valid URI.
#[must_use]
pub fn get_request(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).expect("valid request")
}

/// Build a url-encoded form `POST` request.
///
/// # Panics
///
/// Panics if `path` is not a valid URI.
#[must_use]
pub fn form_request(path: &str, form: &[(&str, &str)]) -> Request<Body> {
    let body = form
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("valid request")
}

/// Form fields for adding a product.
#[must_use]
pub fn product_form<'a>(
    id: &'a str,
    name: &'a str,
    price: &'a str,
    quantity: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("id", id),
        ("name", name),
        ("image", "/static/img/hijab.jpg"),
        ("color", "Dusty Rose"),
        ("price", price),
        ("quantity", quantity),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_form_request_encodes_values() {
        let request = form_request("/cart/add", &[("name", "Rose & Gold"), ("image", "/a b.jpg")]);
        let bytes = to_bytes(request.into_body(), usize::MAX).await.unwrap_or_default();
        assert_eq!(bytes.as_ref(), b"name=Rose%20%26%20Gold&image=%2Fa%20b.jpg");
    }
}

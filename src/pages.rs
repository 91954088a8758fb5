//! Handlers that serve the two static HTML pages.
//!
//! The pages are embedded at compile time; there is no template engine
//! because nothing on them is dynamic.

use axum::response::Html;

/// Serve the login page.
pub async fn get_login_page() -> Html<&'static str> {
    Html(include_str!("../static/login.html"))
}

/// Serve the payment page.
pub async fn get_payment_page() -> Html<&'static str> {
    Html(include_str!("../static/payment.html"))
}

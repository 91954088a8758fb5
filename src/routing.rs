//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, account::get_accounts, endpoints, log_in::post_log_in,
    pages::{get_login_page, get_payment_page},
    payment::post_payment,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_login_page))
        .route(endpoints::PAYMENT_VIEW, get(get_payment_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::PAYMENT_API, post(post_payment))
        .route(endpoints::ACCOUNTS_API, get(get_accounts))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "message": "Not found" })),
    )
        .into_response()
}

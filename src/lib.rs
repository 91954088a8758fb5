//! Paydemo is a small demo web application for recording payments between
//! two seeded demo accounts.
//!
//! This library provides a JSON API (login, payment submission, account
//! listing) and serves the static login and payment pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod app_state;
mod db;
mod endpoints;
mod log_in;
mod logging;
mod pages;
mod payment;
mod routing;
mod session;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::{DEMO_PASSWORD, DEMO_USERNAME, initialize as initialize_db};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use transaction::{Transaction, get_recent_transactions};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username/password pair did not match a stored user.
    ///
    /// Deliberately does not distinguish an unknown username from a wrong
    /// password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request did not carry a valid session cookie.
    #[error("Unauthorized - please login first")]
    NotLoggedIn,

    /// The login request body was missing the username or password field.
    #[error("Username and password are required")]
    MissingCredentials,

    /// The payment request body was missing one of the required fields.
    #[error("Debtor, creditor, and amount are required")]
    MissingPaymentFields,

    /// The payment amount was not numeric or not strictly positive.
    #[error("Invalid amount")]
    InvalidAmount,

    /// The debtor account id did not match a stored account.
    #[error("Invalid debtor account: {0}")]
    InvalidDebtorAccount(String),

    /// The creditor account id did not match a stored account.
    #[error("Invalid creditor account: {0}")]
    InvalidCreditorAccount(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

/// The JSON body used for every error response: a status/message pair.
#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::MissingCredentials
            | Error::MissingPaymentFields
            | Error::InvalidAmount
            | Error::InvalidDebtorAccount(_)
            | Error::InvalidCreditorAccount(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::NotLoggedIn => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            // SQL errors are not intended to be shown to the client.
            Error::SqlError(error) => {
                tracing::error!("an unexpected SQL error occurred: {error}");
                "An internal error occurred".to_owned()
            }
            error => error.to_string(),
        };

        (
            status_code,
            Json(ErrorBody {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}

//! The login endpoint: credential verification and session cookie creation.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, session::set_session_cookie, user::verify_credentials};

/// The raw data of a login request.
///
/// Both fields are optional so that a missing field can be reported as a 400
/// with the demo app's error message instead of a deserialization rejection.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Username entered at login.
    pub username: Option<String>,
    /// Password entered at login.
    pub password: Option<String>,
}

/// The response body of a successful login.
#[derive(Serialize)]
pub struct LogInResponse {
    status: &'static str,
    message: &'static str,
}

/// Handler for login requests via the POST method.
///
/// On success the session cookie is set and a success status is returned.
///
/// # Errors
///
/// - [Error::MissingCredentials] if the username or password field is absent.
/// - [Error::InvalidCredentials] if the pair does not exactly match a stored
///   user. Unknown username and wrong password are indistinguishable.
///
/// # Panics
///
/// Panics if the lock for the database connection is poisoned.
pub async fn post_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(data): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<LogInResponse>), Error> {
    let (username, password) = match (data.username, data.password) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err(Error::MissingCredentials),
    };

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");

        verify_credentials(&username, &password, &connection)?
    };

    tracing::info!("User '{}' logged in", user.username);

    let jar = set_session_cookie(jar, &user.username);

    Ok((
        jar,
        Json(LogInResponse {
            status: "success",
            message: "Login successful",
        }),
    ))
}

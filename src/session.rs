//! Defines functions for handling the login session cookie.
//!
//! The session is carried in a private (signed and encrypted) cookie holding
//! the logged-in username. There is no logout endpoint, so a session lasts
//! until the cookie expires or the browser discards it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::Error;

pub(crate) const COOKIE_SESSION: &str = "session";

/// How long a session cookie stays valid after login.
pub(crate) const SESSION_DURATION: Duration = Duration::hours(24);

/// Add a session cookie to the cookie jar, indicating that `username` is
/// logged in.
///
/// The cookie is flagged HTTP-only and same-site restricted.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(jar: PrivateCookieJar, username: &str) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + SESSION_DURATION;

    jar.add(
        Cookie::build((COOKIE_SESSION, username.to_owned()))
            .expires(expiry)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Get the username recorded in the session cookie.
///
/// # Errors
///
/// Returns [Error::NotLoggedIn] if the session cookie is missing, empty, or
/// fails the private jar's authenticity check (in which case the jar hides
/// the cookie from us entirely).
pub(crate) fn get_session_username(jar: &PrivateCookieJar) -> Result<String, Error> {
    match jar.get(COOKIE_SESSION) {
        Some(cookie) if !cookie.value_trimmed().is_empty() => {
            Ok(cookie.value_trimmed().to_owned())
        }
        _ => Err(Error::NotLoggedIn),
    }
}

//! Code for creating the user table and verifying login credentials.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A user of the application.
///
/// The password is stored and compared as plaintext. This is a known
/// security smell of the demo data set, which is why credential checks are
/// funneled through [verify_credentials] so hashing could be added without
/// touching the call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's unique login name.
    pub username: String,
    /// The user's plaintext password.
    pub password: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred, e.g. the
/// username already exists.
pub fn insert_user(username: &str, password: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password),
    )?;

    Ok(())
}

/// Get the user with the specified `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no user with the specified username
/// or [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT username, password FROM user WHERE username = :username")?
        .query_row(&[(":username", username)], |row| {
            Ok(User {
                username: row.get(0)?,
                password: row.get(1)?,
            })
        })
        .map_err(|error| error.into())
}

/// Count the users in the database.
pub fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Check `username` and `password` against the stored user row.
///
/// The comparison is an exact plaintext match.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the username is unknown or the
/// password does not match. The two cases are deliberately
/// indistinguishable to the caller.
pub fn verify_credentials(
    username: &str,
    password: &str,
    connection: &Connection,
) -> Result<User, Error> {
    let user = match get_user_by_username(username, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if user.password == password {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

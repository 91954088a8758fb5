//! The account table, account queries, and the account listing endpoint.
//!
//! Accounts are seeded once at database initialization and are read-only at
//! runtime.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{AppState, Error};

/// A demo account that payments can be made between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The external string identifier, e.g. "123456789".
    pub account_id: String,
    /// The human-readable account name.
    pub account_name: String,
    /// When the account was created.
    pub created_at: OffsetDateTime,
    /// The account status, e.g. "active".
    pub status: String,
}

/// Create the account table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                account_id TEXT UNIQUE NOT NULL,
                account_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new account into the database.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred, e.g. the
/// account id already exists.
pub fn insert_account(
    account_id: &str,
    account_name: &str,
    created_at: OffsetDateTime,
    status: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO account (account_id, account_name, created_at, status)
            VALUES (?1, ?2, ?3, ?4)",
        (account_id, account_name, created_at, status),
    )?;

    Ok(())
}

/// Get the account with the specified external `account_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no account with the specified id or
/// [Error::SqlError] if an SQL related error occurred.
pub fn get_account_by_id(account_id: &str, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT account_id, account_name, created_at, status
                FROM account WHERE account_id = :account_id",
        )?
        .query_row(&[(":account_id", account_id)], map_account_row)
        .map_err(|error| error.into())
}

/// Get all accounts in storage (insertion) order.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT account_id, account_name, created_at, status
                FROM account ORDER BY id ASC",
        )?
        .query_map([], map_account_row)?
        .map(|account| account.map_err(|error| error.into()))
        .collect()
}

/// Count the accounts in the database.
pub fn count_accounts(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM account", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_account_row(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        account_id: row.get(0)?,
        account_name: row.get(1)?,
        created_at: row.get(2)?,
        status: row.get(3)?,
    })
}

/// The view of an account exposed by the listing endpoint.
#[derive(Serialize)]
struct AccountSummary {
    account_id: String,
    account_name: String,
    status: String,
}

/// The response body of the account listing endpoint.
#[derive(Serialize)]
pub struct AccountsResponse {
    accounts: Vec<AccountSummary>,
}

/// Handler for listing all accounts.
///
/// Note that this endpoint requires no authentication while the payment
/// endpoint does. That asymmetry is documented behavior of the demo app and
/// is preserved here.
///
/// # Panics
///
/// Panics if the lock for the database connection is poisoned.
pub async fn get_accounts(State(state): State<AppState>) -> Result<Json<AccountsResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire lock to database connection");

    let accounts = get_all_accounts(&connection)?
        .into_iter()
        .map(|account| AccountSummary {
            account_id: account.account_id,
            account_name: account.account_name,
            status: account.status,
        })
        .collect();

    Ok(Json(AccountsResponse { accounts }))
}

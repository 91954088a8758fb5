//! The transaction table and queries, plus server-side transaction id
//! generation.
//!
//! Transactions are created exactly once per successful payment request and
//! are never mutated or deleted afterwards.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::Error;

/// The status every transaction is written with.
pub const STATUS_COMPLETED: &str = "completed";

/// A recorded payment between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The unique, server-generated identifier, e.g. "txn_4bf3a2c91d07".
    pub transaction_id: String,
    /// The account the funds are conceptually withdrawn from.
    pub debtor_account_id: String,
    /// The account the funds are conceptually deposited into.
    pub creditor_account_id: String,
    /// The payment amount. Strictly positive.
    pub amount: f64,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// The transaction status, always "completed" in this application.
    pub status: String,
}

/// Create the transaction table.
///
/// The table is named `txn` because `transaction` is an SQL keyword.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS txn (
                id INTEGER PRIMARY KEY,
                transaction_id TEXT UNIQUE NOT NULL,
                debtor_account_id TEXT NOT NULL REFERENCES account(account_id),
                creditor_account_id TEXT NOT NULL REFERENCES account(account_id),
                amount REAL NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Generate a fresh transaction id of the form `txn_` plus 12 lowercase hex
/// digits.
pub fn new_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();

    format!("txn_{}", &hex[..12])
}

/// Insert a transaction into the database.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred, e.g. the
/// transaction id already exists.
pub fn insert_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO txn (transaction_id, debtor_account_id, creditor_account_id, amount, created_at, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &transaction.transaction_id,
            &transaction.debtor_account_id,
            &transaction.creditor_account_id,
            transaction.amount,
            transaction.created_at,
            &transaction.status,
        ),
    )?;

    Ok(())
}

/// Get the transaction with the specified `transaction_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no transaction with the specified
/// id or [Error::SqlError] if an SQL related error occurred.
pub fn get_transaction_by_id(
    transaction_id: &str,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT transaction_id, debtor_account_id, creditor_account_id, amount, created_at, status
                FROM txn WHERE transaction_id = :transaction_id",
        )?
        .query_row(&[(":transaction_id", transaction_id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the `limit` most recently inserted transactions, newest first.
///
/// Used by the test harness to snapshot the store when capturing
/// diagnostics.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_recent_transactions(
    limit: usize,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT transaction_id, debtor_account_id, creditor_account_id, amount, created_at, status
                FROM txn ORDER BY id DESC LIMIT :limit",
        )?
        .query_map(&[(":limit", &(limit as i64))], map_transaction_row)?
        .map(|transaction| transaction.map_err(|error| error.into()))
        .collect()
}

/// Count the transactions in the database.
pub fn count_transactions(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM txn", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_transaction_row(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        debtor_account_id: row.get(1)?,
        creditor_account_id: row.get(2)?,
        amount: row.get(3)?,
        created_at: row.get(4)?,
        status: row.get(5)?,
    })
}

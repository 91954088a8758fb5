//! Database initialization: table creation and one-time seeding of the demo
//! data set.

use rusqlite::Connection;
use time::{OffsetDateTime, macros::datetime};

use crate::{Error, account, transaction, user};

/// The username of the seeded demo user.
pub const DEMO_USERNAME: &str = "demo";

/// The password of the seeded demo user.
///
/// Stored as plaintext, which is a deliberate property of the demo data set.
pub const DEMO_PASSWORD: &str = "password";

/// The fixed list of demo accounts: (account_id, account_name, created_at, status).
const SEED_ACCOUNTS: [(&str, &str, OffsetDateTime, &str); 2] = [
    (
        "123456789",
        "Demo Checking Account",
        datetime!(2024-01-15 09:30:00 UTC),
        "active",
    ),
    (
        "987654321",
        "Demo Savings Account",
        datetime!(2024-01-15 09:30:00 UTC),
        "active",
    ),
];

/// Create the application tables and seed the demo user and accounts.
///
/// Seeding only happens when the corresponding table is empty, so calling
/// this function on an existing database file is a no-op.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    user::create_user_table(connection)?;
    account::create_account_table(connection)?;
    transaction::create_transaction_table(connection)?;

    seed_demo_data(connection)
}

fn seed_demo_data(connection: &Connection) -> Result<(), Error> {
    if user::count_users(connection)? == 0 {
        user::insert_user(DEMO_USERNAME, DEMO_PASSWORD, connection)?;
        tracing::info!("Created demo user '{DEMO_USERNAME}'");
    }

    if account::count_accounts(connection)? == 0 {
        for (account_id, account_name, created_at, status) in SEED_ACCOUNTS {
            account::insert_account(account_id, account_name, created_at, status, connection)?;
            tracing::info!("Created account {account_id} ({account_name})");
        }
    }

    Ok(())
}

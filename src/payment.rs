//! The payment submission endpoint.
//!
//! The validation sequence mirrors the demo contract: session check, field
//! presence, amount coercion, then account resolution. The optional
//! `test_delay` field sleeps the handler so the test harness can exercise
//! client-side timeout behavior; it is honored only when the server was
//! started with the test-delay hook enabled.

use std::time::Duration;

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use tokio::time::sleep;

use crate::{
    AppState, Error,
    account::get_account_by_id,
    session::get_session_username,
    transaction::{STATUS_COMPLETED, Transaction, insert_transaction, new_transaction_id},
};

/// The raw data of a payment request.
///
/// The required fields are optional here so that a missing field can be
/// reported as a 400 with the demo app's error message instead of a
/// deserialization rejection. `amount` is kept as raw JSON because the
/// contract coerces both numbers and numeric strings.
#[derive(Clone, Deserialize)]
pub struct PaymentData {
    /// The account id to withdraw from.
    pub debtor: Option<String>,
    /// The account id to deposit into.
    pub creditor: Option<String>,
    /// The payment amount, as a JSON number or numeric string.
    pub amount: Option<JsonValue>,
    /// Seconds to block the handler before recording the transaction.
    /// Test-only hook, ignored unless enabled at server startup.
    pub test_delay: Option<f64>,
}

/// The response body of a successful payment.
#[derive(Serialize)]
pub struct PaymentResponse {
    status: &'static str,
    transaction_id: String,
    message: &'static str,
}

/// Handler for payment submissions via the POST method.
///
/// On success a transaction row is written with status "completed" and the
/// generated transaction id is returned. Resubmission creates a new
/// transaction with a new id; there is no idempotency key.
///
/// # Errors
///
/// - [Error::NotLoggedIn] if the request has no valid session cookie.
/// - [Error::MissingPaymentFields] if debtor, creditor, or amount is absent.
/// - [Error::InvalidAmount] if the amount is not numeric or not strictly
///   positive.
/// - [Error::InvalidDebtorAccount]/[Error::InvalidCreditorAccount] if an
///   account id does not resolve, naming the offending account.
///
/// # Panics
///
/// Panics if the lock for the database connection is poisoned.
pub async fn post_payment(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(data): Json<PaymentData>,
) -> Result<Json<PaymentResponse>, Error> {
    let username = get_session_username(&jar)?;

    let (debtor, creditor, raw_amount) = match (data.debtor, data.creditor, data.amount) {
        (Some(debtor), Some(creditor), Some(amount)) => (debtor, creditor, amount),
        _ => return Err(Error::MissingPaymentFields),
    };

    let amount = coerce_amount(&raw_amount).ok_or(Error::InvalidAmount)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    // The lock must be released before the test delay so a sleeping request
    // does not starve the rest of the app of database access.
    {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");

        if let Err(error) = get_account_by_id(&debtor, &connection) {
            return Err(match error {
                Error::NotFound => Error::InvalidDebtorAccount(debtor),
                error => error,
            });
        }

        if let Err(error) = get_account_by_id(&creditor, &connection) {
            return Err(match error {
                Error::NotFound => Error::InvalidCreditorAccount(creditor),
                error => error,
            });
        }
    }

    if state.allow_test_delay {
        if let Some(duration) = data.test_delay.and_then(test_delay_duration) {
            tracing::info!(
                "[TEST MODE] Simulating {} second delay...",
                duration.as_secs_f64()
            );
            sleep(duration).await;
        }
    }

    let transaction = Transaction {
        transaction_id: new_transaction_id(),
        debtor_account_id: debtor,
        creditor_account_id: creditor,
        amount,
        created_at: OffsetDateTime::now_utc(),
        status: STATUS_COMPLETED.to_owned(),
    };

    {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");

        insert_transaction(&transaction, &connection)?;
    }

    tracing::info!(
        "Recorded transaction {} for user '{username}'",
        transaction.transaction_id
    );

    Ok(Json(PaymentResponse {
        status: "success",
        transaction_id: transaction.transaction_id,
        message: "Payment processed successfully",
    }))
}

/// The longest delay the test hook will honor, in seconds.
///
/// `Duration::from_secs_f64` panics on values it cannot represent, so the
/// requested delay is clamped before conversion.
const MAX_TEST_DELAY_SECS: f64 = 60.0;

/// Convert a requested test delay into a sleep duration.
///
/// Non-finite and non-positive delays are ignored; anything above
/// [MAX_TEST_DELAY_SECS] is clamped down to it.
fn test_delay_duration(delay: f64) -> Option<Duration> {
    if !delay.is_finite() || delay <= 0.0 {
        return None;
    }

    Some(Duration::from_secs_f64(delay.min(MAX_TEST_DELAY_SECS)))
}

/// Coerce a JSON value to a float the way the demo contract expects: numbers
/// pass through, numeric strings are parsed, everything else is rejected.
fn coerce_amount(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

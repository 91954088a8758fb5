//! The application's endpoint URIs.

/// The route for the static login page.
pub const ROOT: &str = "/";
/// The route for the static payment page.
pub const PAYMENT_VIEW: &str = "/payment.html";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/login";
/// The route for submitting a payment.
pub const PAYMENT_API: &str = "/payment";
/// The route for listing the accounts.
pub const ACCOUNTS_API: &str = "/accounts";

//! Timeout scenario test with diagnostic capture.
//!
//! The payment request is made with a backend `test_delay` longer than the
//! client-side wait, so the client gives up first. When that happens the
//! test captures a diagnostic bundle into a timestamped directory: the
//! request/response log, session cookies, the payment page markup, element
//! states, a snapshot of the most recent transaction rows, a
//! machine-readable summary and a human-readable report. It then asserts
//! that the server-side write still completed, because a client-side
//! timeout does not cancel the server-side operation.

use std::{fs, path::PathBuf, time::Duration};

use axum_test::TestServer;
use rusqlite::Connection;
use scraper::{Html, Selector};
use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

use paydemo::{AppState, build_router, get_recent_transactions};

/// Seconds the backend is told to stall.
const BACKEND_DELAY_SECS: f64 = 3.0;

/// Seconds the client waits before giving up. Deliberately shorter than the
/// backend delay so the timeout always fires.
const CLIENT_TIMEOUT_SECS: u64 = 1;

/// A sequential log of the HTTP traffic the harness produced, written out as
/// part of the diagnostic bundle.
struct TrafficLog {
    entries: Vec<serde_json::Value>,
}

impl TrafficLog {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn record(&mut self, method: &str, path: &str, status: Option<u16>, note: &str) {
        self.entries.push(json!({
            "timestamp": now_rfc3339(),
            "method": method,
            "path": path,
            "status": status,
            "note": note,
        }));
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("Could not format timestamp")
}

fn start_app() -> (TestServer, AppState) {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let state = AppState::new(connection, "test-secret", true)
        .expect("Could not create app state");

    let mut server = TestServer::new(build_router(state.clone()));
    server.save_cookies();

    (server, state)
}

fn make_diagnostics_dir() -> PathBuf {
    let timestamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .expect("Could not format directory timestamp");

    let dir = PathBuf::from("test_diagnostics").join(format!("payment_timeout_{timestamp}"));
    fs::create_dir_all(&dir).expect("Could not create diagnostics directory");

    dir
}

/// Record the visibility-relevant elements of the payment page markup.
fn capture_element_states(markup: &str) -> serde_json::Value {
    let document = Html::parse_document(markup);

    let mut states = serde_json::Map::new();
    for element_id in ["success-msg", "error-msg", "submit-btn", "amount"] {
        let selector = Selector::parse(&format!("#{element_id}")).unwrap();
        let state = match document.select(&selector).next() {
            Some(element) => json!({
                "present": true,
                "text": element.text().collect::<String>(),
            }),
            None => json!({ "present": false }),
        };
        states.insert(element_id.to_string(), state);
    }

    serde_json::Value::Object(states)
}

fn snapshot_transactions(state: &AppState) -> serde_json::Value {
    let connection = state.db_connection.lock().unwrap();
    let recent = get_recent_transactions(5, &connection).expect("Could not read transactions");

    serde_json::to_value(recent).expect("Could not serialize transactions")
}

#[tokio::test]
async fn payment_timeout_with_diagnostics() {
    let (server, state) = start_app();
    let mut traffic = TrafficLog::new();

    // Step 1: log in and hold on to the session cookie for the bundle.
    let login_response = server
        .post("/login")
        .json(&json!({ "username": "demo", "password": "password" }))
        .await;
    login_response.assert_status_ok();
    traffic.record("POST", "/login", Some(200), "login with demo credentials");

    let session_cookie = login_response.cookie("session");

    // Step 2: fetch the payment page the way a browser would before submitting.
    let page_response = server.get("/payment.html").await;
    page_response.assert_status_ok();
    traffic.record("GET", "/payment.html", Some(200), "payment page loaded");
    let page_markup = page_response.text();

    // Step 3: submit a payment that the backend will stall on. The request
    // runs in its own task so that the client timing out does not cancel it.
    let submit_time = OffsetDateTime::now_utc();
    let request = server.post("/payment").json(&json!({
        "debtor": "123456789",
        "creditor": "987654321",
        "amount": 150.00,
        "test_delay": BACKEND_DELAY_SECS,
    }));
    traffic.record(
        "POST",
        "/payment",
        None,
        "payment submitted with test_delay, awaiting response",
    );
    let mut in_flight = tokio::spawn(async move { request.await });

    // Step 4: wait with a client-side timeout shorter than the backend delay.
    let timed_out =
        tokio::time::timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS), &mut in_flight)
            .await
            .is_err();
    assert!(
        timed_out,
        "client wait of {CLIENT_TIMEOUT_SECS}s should elapse before the {BACKEND_DELAY_SECS}s backend delay"
    );

    // Step 5: the timeout fired. Capture the diagnostic bundle.
    let failure_time = OffsetDateTime::now_utc();
    let dir = make_diagnostics_dir();

    fs::write(dir.join("page_content.html"), &page_markup)
        .expect("Could not write page content");

    fs::write(
        dir.join("cookies.json"),
        serde_json::to_string_pretty(&json!([{
            "name": session_cookie.name(),
            "value": session_cookie.value(),
            "http_only": session_cookie.http_only(),
            "same_site": format!("{:?}", session_cookie.same_site()),
        }]))
        .unwrap(),
    )
    .expect("Could not write cookies");

    fs::write(
        dir.join("requests_responses.json"),
        serde_json::to_string_pretty(&traffic.entries).unwrap(),
    )
    .expect("Could not write traffic log");

    fs::write(
        dir.join("element_states.json"),
        serde_json::to_string_pretty(&capture_element_states(&page_markup)).unwrap(),
    )
    .expect("Could not write element states");

    // At the moment the client gave up, the delay was still running, so the
    // store snapshot should not contain the stalled payment yet.
    let snapshot_at_timeout = snapshot_transactions(&state);
    fs::write(
        dir.join("transactions_snapshot.json"),
        serde_json::to_string_pretty(&snapshot_at_timeout).unwrap(),
    )
    .expect("Could not write transactions snapshot");
    assert_eq!(
        snapshot_at_timeout.as_array().map(Vec::len),
        Some(0),
        "the stalled payment should not be written before its delay elapses"
    );

    let summary = json!({
        "test": "payment_timeout_with_diagnostics",
        "submitted_at": submit_time.format(&Rfc3339).unwrap(),
        "timed_out_at": failure_time.format(&Rfc3339).unwrap(),
        "client_timeout_secs": CLIENT_TIMEOUT_SECS,
        "backend_delay_secs": BACKEND_DELAY_SECS,
        "outcome": "client timed out while the backend delay was still running",
        "artifacts": [
            "page_content.html",
            "cookies.json",
            "requests_responses.json",
            "element_states.json",
            "transactions_snapshot.json",
            "report.md",
        ],
    });
    fs::write(
        dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).unwrap(),
    )
    .expect("Could not write summary");

    let report = format!(
        "# Payment timeout diagnostics\n\n\
        The payment was submitted at {} with a backend delay of {BACKEND_DELAY_SECS}s.\n\
        The client gave up after {CLIENT_TIMEOUT_SECS}s (at {}).\n\n\
        At that moment no transaction row existed yet: the backend was still\n\
        sleeping out its artificial delay. See `summary.json` for the\n\
        machine-readable version of this report and the sibling files for the\n\
        captured page markup, cookies, traffic log, and store snapshot.\n",
        summary["submitted_at"].as_str().unwrap(),
        summary["timed_out_at"].as_str().unwrap(),
    );
    fs::write(dir.join("report.md"), report).expect("Could not write report");

    // Step 6: the server-side operation was never cancelled. Once the delay
    // elapses the transaction is written even though the client gave up.
    let response = in_flight
        .await
        .expect("the in-flight payment task should not panic");
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "success");

    let connection = state.db_connection.lock().unwrap();
    let recent = get_recent_transactions(5, &connection).expect("Could not read transactions");
    assert_eq!(recent.len(), 1, "the delayed payment should still be written");
    assert_eq!(
        recent[0].transaction_id,
        body["transaction_id"].as_str().unwrap()
    );
}

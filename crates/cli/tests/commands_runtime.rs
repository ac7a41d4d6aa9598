use std::env;
use std::net::SocketAddr;
use std::sync::{mpsc, Mutex, OnceLock};
use std::thread;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use clientele_cli::commands::customers::{self, CustomerAction};
use clientele_cli::commands::{config, doctor, migrate};
use serde_json::{json, Value};

const KNOWN_ID: &str = "3f2b6c1e-8a4d-4f6b-9c2e-1d5a7b9e0f12";
const UNKNOWN_ID: &str = "00000000-0000-4000-8000-000000000000";

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("CLIENTELE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("CLIENTELE_DATABASE_URL", "postgres://localhost/customers")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_returns_db_failure_when_database_cannot_open() {
    with_env(
        &[
            ("CLIENTELE_DATABASE_URL", "sqlite:///clientele-missing-dir/nested/customers.db"),
            ("CLIENTELE_DATABASE_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 4, "expected db connectivity failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "db_connectivity");
        },
    );
}

#[test]
fn customers_get_rejects_malformed_id_before_any_request() {
    // Unroutable base URL: the command must fail on the id, not the network.
    with_env(&[("CLIENTELE_CLIENT_BASE_URL", "http://127.0.0.1:9")], || {
        let result = customers::run(CustomerAction::Get { id: "not-a-uuid".to_string() });
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers get");
        assert_eq!(payload["error_class"], "invalid_input");
        assert_eq!(payload["message"], "Invalid UUID format.");
    });
}

#[test]
fn customers_list_reports_unreachable_api() {
    with_env(
        &[
            ("CLIENTELE_CLIENT_BASE_URL", "http://127.0.0.1:9"),
            ("CLIENTELE_CLIENT_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = customers::run(CustomerAction::List);
            assert_eq!(result.exit_code, 7);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "customers list");
            assert_eq!(payload["error_class"], "api_unreachable");
        },
    );
}

#[test]
fn customers_get_prints_the_customer_body() {
    let base_url = spawn_customer_api();
    with_env(&[("CLIENTELE_CLIENT_BASE_URL", base_url.as_str())], || {
        let result = customers::run(CustomerAction::Get { id: KNOWN_ID.to_string() });
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let body = parse_payload(&result.output);
        assert_eq!(body["id"], KNOWN_ID);
        assert_eq!(body["firstName"], "Ada");
        assert_eq!(body["emailAddress"], "ada@example.com");
    });
}

#[test]
fn customers_get_surfaces_api_errors() {
    let base_url = spawn_customer_api();
    with_env(&[("CLIENTELE_CLIENT_BASE_URL", base_url.as_str())], || {
        let result = customers::run(CustomerAction::Get { id: UNKNOWN_ID.to_string() });
        assert_eq!(result.exit_code, 8);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers get");
        assert_eq!(payload["error_class"], "api_error");
        assert_eq!(payload["http_status"], 404);
        assert_eq!(payload["message"], format!("Customer not found with ID: {UNKNOWN_ID}"));
        assert_eq!(payload["response"]["error"], "Not Found");
    });
}

#[test]
fn customers_delete_reports_the_deleted_id() {
    let base_url = spawn_customer_api();
    with_env(&[("CLIENTELE_CLIENT_BASE_URL", base_url.as_str())], || {
        let result = customers::run(CustomerAction::Delete { id: KNOWN_ID.to_string() });
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers delete");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], format!("customer {KNOWN_ID} deleted"));
    });
}

#[test]
fn config_attributes_env_sources() {
    with_env(&[("CLIENTELE_SERVER_PORT", "9191")], || {
        let output = config::run();
        assert!(output.contains("- server.port = 9191 (source: env (CLIENTELE_SERVER_PORT))"));
        assert!(output.contains("- client.timeout_secs = 10 (source: default)"));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[("CLIENTELE_LOG_LEVEL", "loud")], || {
        let report: Value = serde_json::from_str(&doctor::run(true)).expect("doctor json");
        assert_eq!(report["overall_status"], "fail");

        let statuses: Vec<_> = report["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .map(|check| (check["name"].clone(), check["status"].clone()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (Value::from("config_validation"), Value::from("fail")),
                (Value::from("database_connectivity"), Value::from("skipped")),
                (Value::from("api_reachability"), Value::from("skipped")),
            ]
        );
    });
}

/// Serves a canned customer API on an ephemeral port from its own thread, since
/// the commands drive their own runtime. Returns the base URL.
fn spawn_customer_api() -> String {
    let (address_tx, address_rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener =
                tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
            address_tx.send(listener.local_addr().expect("stub address")).expect("send address");
            axum::serve(listener, customer_routes()).await.expect("serve stub api");
        });
    });

    let address = address_rx.recv().expect("stub api should report its address");
    format!("http://{address}")
}

fn customer_routes() -> Router {
    Router::new().route("/v1/customers/{id}", get(find_customer).delete(remove_customer))
}

async fn find_customer(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == KNOWN_ID {
        return (
            StatusCode::OK,
            Json(json!({
                "id": KNOWN_ID,
                "firstName": "Ada",
                "middleName": null,
                "lastName": "Lovelace",
                "emailAddress": "ada@example.com",
                "phoneNumber": "+14155550100"
            })),
        );
    }
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "timestamp": "2026-01-01T00:00:00Z",
            "error": "Not Found",
            "message": format!("Customer not found with ID: {id}"),
            "details": []
        })),
    )
}

async fn remove_customer(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CLIENTELE_DATABASE_URL",
        "CLIENTELE_DATABASE_MAX_CONNECTIONS",
        "CLIENTELE_DATABASE_TIMEOUT_SECS",
        "CLIENTELE_SERVER_BIND_ADDRESS",
        "CLIENTELE_SERVER_PORT",
        "CLIENTELE_CLIENT_BASE_URL",
        "CLIENTELE_CLIENT_TIMEOUT_SECS",
        "CLIENTELE_LOGGING_LEVEL",
        "CLIENTELE_LOGGING_FORMAT",
        "CLIENTELE_LOG_LEVEL",
        "CLIENTELE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

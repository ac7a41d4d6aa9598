pub mod config;
pub mod customers;
pub mod doctor;
pub mod migrate;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            http_status: None,
            response: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            http_status: None,
            response: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure carrying the HTTP status and the API's error body.
    pub fn api_failure(command: &str, http_status: u16, response: Value, exit_code: u8) -> Self {
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with HTTP {http_status}"));
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some("api_error".to_string()),
            message,
            http_status: Some(http_status),
            response: Some(response),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            concat!(
                "{{\"command\":\"unknown\",\"status\":\"error\",",
                "\"error_class\":\"serialization\",\"message\":\"{}\"}}"
            ),
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::CommandResult;

    #[test]
    fn api_failure_surfaces_status_and_message() {
        let result = CommandResult::api_failure(
            "customers get",
            404,
            json!({ "error": "Not Found", "message": "Customer not found with ID: x" }),
            8,
        );

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 8);
        assert_eq!(payload["http_status"], 404);
        assert_eq!(payload["message"], "Customer not found with ID: x");
        assert_eq!(payload["response"]["error"], "Not Found");
    }

    #[test]
    fn plain_failures_omit_http_fields() {
        let result = CommandResult::failure("migrate", "migration", "boom", 5);
        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert!(payload.get("http_status").is_none());
        assert_eq!(payload["error_class"], "migration");
    }
}

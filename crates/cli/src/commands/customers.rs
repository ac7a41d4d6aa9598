//! HTTP client for the `/v1/customers` resource.

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Subcommand};
use clientele_core::config::{AppConfig, ClientConfig, LoadOptions};
use clientele_core::domain::customer::{CustomerId, CustomerInput};
use clientele_core::errors::CustomerError;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::commands::CommandResult;

const INVALID_INPUT_EXIT: u8 = 6;
const UNREACHABLE_EXIT: u8 = 7;
const API_ERROR_EXIT: u8 = 8;

#[derive(Debug, Subcommand)]
pub enum CustomerAction {
    #[command(about = "List every customer")]
    List,
    #[command(about = "Fetch one customer by id")]
    Get { id: String },
    #[command(about = "Create a customer")]
    Create(CustomerFields),
    #[command(about = "Replace a customer's name, email and phone")]
    Update {
        id: String,
        #[command(flatten)]
        fields: CustomerFields,
    },
    #[command(about = "Delete a customer by id")]
    Delete { id: String },
}

impl CustomerAction {
    fn command_name(&self) -> &'static str {
        match self {
            Self::List => "customers list",
            Self::Get { .. } => "customers get",
            Self::Create(_) => "customers create",
            Self::Update { .. } => "customers update",
            Self::Delete { .. } => "customers delete",
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct CustomerFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub middle_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long = "email")]
    pub email_address: Option<String>,
    #[arg(long = "phone")]
    pub phone_number: Option<String>,
}

impl CustomerFields {
    /// Blank values are sent as absent, the same as leaving the flag off.
    pub fn to_input(&self) -> CustomerInput {
        CustomerInput {
            id: None,
            first_name: non_blank(&self.first_name),
            middle_name: non_blank(&self.middle_name),
            last_name: non_blank(&self.last_name),
            email_address: non_blank(&self.email_address),
            phone_number: non_blank(&self.phone_number),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

struct ApiClient {
    http: Client,
    base_url: String,
}

struct ApiResponse {
    status: StatusCode,
    body: Value,
}

impl ApiClient {
    fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&CustomerInput>,
    ) -> anyhow::Result<ApiResponse> {
        let url = customers_url(&self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        let text = response.text().await.context("failed to read response body")?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse { status, body })
    }
}

pub fn customers_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.is_empty() {
        format!("{base}/v1/customers")
    } else {
        format!("{base}/v1/customers/{path}")
    }
}

pub fn run(action: CustomerAction) -> CommandResult {
    let command = action.command_name();

    // Ids are checked before any network traffic.
    let id = match &action {
        CustomerAction::Get { id }
        | CustomerAction::Update { id, .. }
        | CustomerAction::Delete { id } => match CustomerId::parse(id) {
            Ok(id) => Some(id),
            Err(error) => {
                return CommandResult::failure(
                    command,
                    "invalid_input",
                    error_message(&error),
                    INVALID_INPUT_EXIT,
                );
            }
        },
        CustomerAction::List | CustomerAction::Create(_) => None,
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let client = match ApiClient::new(&config.client) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(command, "runtime_init", format!("{error:#}"), 3);
        }
    };

    let path = id.map(|id| id.to_string()).unwrap_or_default();
    let outcome = runtime.block_on(async {
        match &action {
            CustomerAction::List | CustomerAction::Get { .. } => {
                client.send(Method::GET, &path, None).await
            }
            CustomerAction::Create(fields) => {
                client.send(Method::POST, "", Some(&fields.to_input())).await
            }
            CustomerAction::Update { fields, .. } => {
                client.send(Method::PUT, &path, Some(&fields.to_input())).await
            }
            CustomerAction::Delete { .. } => client.send(Method::DELETE, &path, None).await,
        }
    });

    match outcome {
        Err(error) => {
            CommandResult::failure(
                command,
                "api_unreachable",
                format!("{error:#}"),
                UNREACHABLE_EXIT,
            )
        }
        Ok(response) if !response.status.is_success() => {
            CommandResult::api_failure(
                command,
                response.status.as_u16(),
                response.body,
                API_ERROR_EXIT,
            )
        }
        Ok(_) if matches!(action, CustomerAction::Delete { .. }) => {
            CommandResult::success(command, format!("customer {path} deleted"))
        }
        Ok(response) => CommandResult {
            exit_code: 0,
            output: serde_json::to_string_pretty(&response.body)
                .unwrap_or_else(|_| response.body.to_string()),
        },
    }
}

fn error_message(error: &CustomerError) -> String {
    match error {
        CustomerError::InvalidInput { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

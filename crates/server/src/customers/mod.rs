//! `/v1/customers` resource.
//!
//! Handlers run shape validation before touching [`CustomerService`]; every
//! failure is rendered through [`ApiError`] so callers always get the same
//! error body.

pub mod service;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use clientele_core::domain::customer::{Customer, CustomerId, CustomerInput};
use clientele_core::errors::CustomerError;
use clientele_core::validation::validate_customer;
use tracing::debug;

use crate::error::{ApiError, ErrorBody};
use service::CustomerService;

#[derive(Clone)]
pub struct CustomerState {
    service: CustomerService,
}

pub fn router(service: CustomerService) -> Router {
    Router::new()
        .route("/v1/customers", get(list_customers).post(create_customer))
        .route(
            "/v1/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(CustomerState { service })
}

fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<CustomerId, ApiError> {
    let Path(raw) = path?;
    Ok(CustomerId::parse(&raw)?)
}

fn validated_body(
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<CustomerInput, ApiError> {
    let Json(input) = payload?;
    validate_customer(&input).map_err(|violations| {
        debug!(
            event_name = "api.validation_failed",
            violations = violations.len(),
            "payload rejected"
        );
        CustomerError::from(violations)
    })?;
    Ok(input)
}

/// Create a customer.
#[utoipa::path(
    post,
    path = "/v1/customers",
    tag = "customers",
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation failed or malformed body", body = ErrorBody),
        (status = 409, description = "Duplicate email", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    )
)]
pub async fn create_customer(
    State(state): State<CustomerState>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let input = validated_body(payload)?;
    let created = state.service.create_customer(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List every customer in insertion order.
#[utoipa::path(
    get,
    path = "/v1/customers",
    tag = "customers",
    responses(
        (status = 200, description = "All customers", body = [Customer]),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    )
)]
pub async fn list_customers(
    State(state): State<CustomerState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.service.get_all_customers().await?))
}

#[utoipa::path(
    get,
    path = "/v1/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer id, hyphenated UUID")),
    responses(
        (status = 200, description = "The customer", body = Customer),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No customer with this id", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    )
)]
pub async fn get_customer(
    State(state): State<CustomerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(path)?;
    Ok(Json(state.service.get_customer_by_id(&id).await?))
}

/// Replace first name, last name, email and phone. Middle name is kept.
#[utoipa::path(
    put,
    path = "/v1/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer id, hyphenated UUID")),
    request_body = CustomerInput,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Malformed id or validation failed", body = ErrorBody),
        (status = 404, description = "No customer with this id", body = ErrorBody),
        (status = 409, description = "Duplicate email", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    )
)]
pub async fn update_customer(
    State(state): State<CustomerState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = parse_id(path)?;
    let input = validated_body(payload)?;
    Ok(Json(state.service.update_customer(&id, &input).await?))
}

#[utoipa::path(
    delete,
    path = "/v1/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer id, hyphenated UUID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No customer with this id", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    )
)]
pub async fn delete_customer(
    State(state): State<CustomerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    state.service.delete_customer(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use clientele_db::repositories::SqlCustomerRepository;
    use clientele_db::{connect_with_settings, migrations};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;
    use super::service::CustomerService;

    async fn app() -> Router {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        router(CustomerService::new(Arc::new(SqlCustomerRepository::new(pool))))
    }

    async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        dispatch(app, request).await
    }

    async fn post(app: &Router, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, "/v1/customers", Some(body)).await
    }

    fn payload(first: &str, last: &str, email: &str) -> Value {
        json!({
            "firstName": first,
            "lastName": last,
            "emailAddress": email,
            "phoneNumber": "12345"
        })
    }

    #[tokio::test]
    async fn create_read_update_delete_round_trip() {
        let app = app().await;

        let (status, created) = post(&app, payload("test", "email", "a@test.com")).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().expect("generated id").to_string();
        assert_eq!(created["firstName"], "test");
        assert_eq!(created["lastName"], "email");
        assert_eq!(created["emailAddress"], "a@test.com");
        assert_eq!(created["phoneNumber"], "12345");

        let uri = format!("/v1/customers/{id}");
        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) =
            send(&app, Method::PUT, &uri, Some(payload("test2", "email2", "a@test.com"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["firstName"], "test2");
        assert_eq!(updated["lastName"], "email2");

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, missing) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["error"], "Not Found");
        assert_eq!(missing["message"], format!("Customer not found with ID: {id}"));
    }

    #[tokio::test]
    async fn list_returns_records_in_insertion_order() {
        let app = app().await;
        for (index, email) in ["one@test.com", "two@test.com"].into_iter().enumerate() {
            let body =
                json!({ "firstName": format!("n{index}"), "lastName": "x", "emailAddress": email });
            let (status, _) = post(&app, body).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, list) = send(&app, Method::GET, "/v1/customers", None).await;
        assert_eq!(status, StatusCode::OK);
        let emails: Vec<_> =
            list.as_array().expect("array").iter().map(|c| c["emailAddress"].clone()).collect();
        assert_eq!(emails, vec![json!("one@test.com"), json!("two@test.com")]);
    }

    #[tokio::test]
    async fn validation_failures_are_reported_together() {
        let app = app().await;

        let (status, body) =
            post(&app, json!({ "firstName": " ", "emailAddress": "nope", "phoneNumber": "0" }))
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["message"], "Validation failed.");
        assert_eq!(
            body["details"],
            json!([
                "First name is required.",
                "Last name is required.",
                "Email should be valid.",
                "Phone number must be valid and follow E.164 format."
            ])
        );
        assert!(body["timestamp"].is_string());

        let (_, list) = send(&app, Method::GET, "/v1/customers", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn unicode_email_addresses_are_accepted() {
        let app = app().await;

        let (status, created) = post(&app, payload("Jörg", "Müller", "jörg@münchen.de")).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["emailAddress"], "jörg@münchen.de");
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_before_lookup() {
        let app = app().await;

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/v1/customers/not-a-uuid", None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Invalid UUID format.");
        }

        let uri = "/v1/customers/not-a-uuid";
        let (status, body) =
            send(&app, Method::PUT, uri, Some(payload("a", "b", "c@test.com"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid UUID format.");

        let simple = uuid::Uuid::new_v4().simple().to_string();
        let (status, _) = send(&app, Method::GET, &format!("/v1/customers/{simple}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app().await;
        let uri = format!("/v1/customers/{}", uuid::Uuid::new_v4());

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&app, Method::PUT, &uri, Some(payload("a", "b", "c@test.com"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = app().await;
        let (status, _) = post(&app, payload("a", "b", "dup@test.com")).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post(&app, payload("c", "d", "dup@test.com")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");

        let (_, list) = send(&app, Method::GET, "/v1/customers", None).await;
        assert_eq!(list.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn malformed_json_gets_a_structured_bad_request() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/customers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"firstName\": "))
            .expect("request");

        let (status, body) = dispatch(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Malformed JSON request.");
        assert_eq!(body["details"].as_array().map(Vec::len), Some(1));

        let (status, body) = post(&app, json!({ "firstName": 5, "lastName": "x" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Malformed JSON request.");
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/customers")
            .body(Body::from(payload("a", "b", "ct@test.com").to_string()))
            .expect("request");

        let (status, body) = dispatch(&app, request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"], "Unsupported Media Type");
        assert_eq!(body["message"], "Content-Type must be application/json.");
    }

    #[tokio::test]
    async fn oversized_body_keeps_payload_too_large_status() {
        let app = app().await;
        let padding = "x".repeat(3 * 1024 * 1024);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/customers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "firstName": padding }).to_string()))
            .expect("request");

        let (status, body) = dispatch(&app, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Payload Too Large");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn update_ignores_middle_name_and_body_id() {
        let app = app().await;
        let (_, created) = post(
            &app,
            json!({
                "firstName": "a", "middleName": "m", "lastName": "b", "emailAddress": "mid@test.com"
            }),
        )
        .await;
        let id = created["id"].as_str().expect("id").to_string();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/v1/customers/{id}"),
            Some(json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "firstName": "a2", "middleName": "changed", "lastName": "b2",
                "emailAddress": "mid@test.com"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["middleName"], "m");
        assert_eq!(updated["phoneNumber"], Value::Null);
    }
}

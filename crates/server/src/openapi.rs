use axum::{routing::get, Json, Router};
use clientele_core::domain::customer::{Customer, CustomerInput};
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::health::{Readiness, StoreReadiness};

#[derive(OpenApi)]
#[openapi(
    info(title = "Clientele customer API", description = "Customer records over HTTP/JSON"),
    paths(
        crate::customers::create_customer,
        crate::customers::list_customers,
        crate::customers::get_customer,
        crate::customers::update_customer,
        crate::customers::delete_customer,
        crate::health::health,
    ),
    components(schemas(Customer, CustomerInput, ErrorBody, StoreReadiness, Readiness)),
    tags(
        (name = "customers", description = "Create, read, update and delete customers"),
        (name = "health", description = "Store readiness")
    )
)]
pub struct ApiDoc;

/// Serves the generated document at `/openapi.json`.
pub fn router() -> Router {
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

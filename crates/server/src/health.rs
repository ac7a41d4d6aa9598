//! Readiness of the customer store: the database answers, every embedded
//! migration has been applied and the `customer` table can be read.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use clientele_db::migrations::MIGRATOR;
use clientele_db::DbPool;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    MigrationsPending,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreReadiness {
    pub status: Readiness,
    /// Highest applied migration version, if any.
    pub schema_version: Option<i64>,
    pub pending_migrations: usize,
    /// Number of stored customers; absent unless the table is readable.
    pub customer_count: Option<i64>,
    pub detail: String,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Store is migrated and readable", body = StoreReadiness),
        (status = 503, description = "Database down or migrations pending", body = StoreReadiness),
    )
)]
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<StoreReadiness>) {
    let readiness = check_store(&state.db_pool).await;
    if readiness.status != Readiness::Ready {
        warn!(
            event_name = "system.health.not_ready",
            status = ?readiness.status,
            detail = %readiness.detail,
            "store not ready"
        );
    }

    let status_code = match readiness.status {
        Readiness::Ready => StatusCode::OK,
        Readiness::MigrationsPending | Readiness::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(readiness))
}

async fn check_store(pool: &DbPool) -> StoreReadiness {
    let unavailable = |detail: String| StoreReadiness {
        status: Readiness::Unavailable,
        schema_version: None,
        pending_migrations: 0,
        customer_count: None,
        detail,
        checked_at: Utc::now().to_rfc3339(),
    };

    let applied = match applied_versions(pool).await {
        Ok(applied) => applied,
        Err(error) => return unavailable(format!("migration history unreadable: {error}")),
    };
    let schema_version = applied.iter().copied().max();
    let pending_migrations =
        MIGRATOR.iter().filter(|migration| !applied.contains(&migration.version)).count();

    if pending_migrations > 0 {
        return StoreReadiness {
            status: Readiness::MigrationsPending,
            schema_version,
            pending_migrations,
            customer_count: None,
            detail: format!("{pending_migrations} migration(s) not applied"),
            checked_at: Utc::now().to_rfc3339(),
        };
    }

    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer").fetch_one(pool).await {
        Ok(count) => StoreReadiness {
            status: Readiness::Ready,
            schema_version,
            pending_migrations,
            customer_count: Some(count),
            detail: "customer store migrated and readable".to_string(),
            checked_at: Utc::now().to_rfc3339(),
        },
        Err(error) => StoreReadiness {
            schema_version,
            ..unavailable(format!("customer table unreadable: {error}"))
        },
    }
}

/// Successfully applied migration versions. A database that was never migrated
/// has no history table and reports none.
async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>, sqlx::Error> {
    let (history_tables,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if history_tables == 0 {
        return Ok(Vec::new());
    }

    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success = 1")
        .fetch_all(pool)
        .await
}

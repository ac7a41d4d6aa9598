use std::sync::Arc;

use axum::Router;
use clientele_core::config::AppConfig;
use clientele_db::repositories::SqlCustomerRepository;
use clientele_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::customers::{self, service::CustomerService};
use crate::{health, openapi};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub customers: CustomerService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl Application {
    /// Full HTTP surface: customer resource, readiness check and API document,
    /// with request tracing.
    pub fn router(&self) -> Router {
        customers::router(self.customers.clone())
            .merge(health::router(self.db_pool.clone()))
            .merge(openapi::router())
            .layer(TraceLayer::new_for_http())
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let repository = Arc::new(SqlCustomerRepository::new(db_pool.clone()));
    let customers = CustomerService::new(repository);

    Ok(Application { config, db_pool, customers })
}

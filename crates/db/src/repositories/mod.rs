use async_trait::async_trait;
use thiserror::Error;

use clientele_core::domain::customer::{Customer, CustomerId, NewCustomer};

pub mod customer;
pub mod memory;

pub use customer::SqlCustomerRepository;
pub use memory::InMemoryCustomerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Durable keyed collection of customer records.
///
/// Writes are single-record and atomic: a write that breaks a uniqueness rule
/// fails with [`RepositoryError::ConstraintViolation`] and stores nothing.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    /// Upserts by id and returns the stored row.
    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError>;
    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError>;
}

pub(crate) const DUPLICATE_EMAIL: &str = "email address is already in use";
pub(crate) const DUPLICATE_PHONE_EMAIL: &str =
    "phone number and email address combination is already in use";

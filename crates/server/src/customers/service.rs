use std::sync::Arc;

use clientele_core::domain::customer::{Customer, CustomerId, CustomerInput};
use clientele_core::errors::CustomerError;
use clientele_core::validation::require_names;
use clientele_db::repositories::{CustomerRepository, RepositoryError};
use tracing::{debug, error, info, warn};

/// Business rules for customer records: required names on create, existence
/// checks, and full-field overwrite on update.
#[derive(Clone)]
pub struct CustomerService {
    repository: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, CustomerError> {
        let new_customer = require_names(input).inspect_err(|_| {
            warn!(
                event_name = "customer.create.rejected",
                "customer creation failed due to missing required fields"
            );
        })?;

        let created = self.repository.insert(new_customer).await.map_err(repository_error)?;
        info!(
            event_name = "customer.created",
            customer_id = %created.id,
            "customer created"
        );
        Ok(created)
    }

    pub async fn get_all_customers(&self) -> Result<Vec<Customer>, CustomerError> {
        let customers = self.repository.find_all().await.map_err(repository_error)?;
        debug!(event_name = "customer.list", count = customers.len(), "customers retrieved");
        Ok(customers)
    }

    pub async fn get_customer_by_id(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        match self.repository.find_by_id(id).await.map_err(repository_error)? {
            Some(customer) => Ok(customer),
            None => {
                warn!(event_name = "customer.not_found", customer_id = %id, "customer not found");
                Err(CustomerError::NotFound(*id))
            }
        }
    }

    /// Overwrites first name, last name, email and phone. Middle name and id
    /// are not part of the update contract and keep their stored values.
    pub async fn update_customer(
        &self,
        id: &CustomerId,
        input: &CustomerInput,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get_customer_by_id(id).await?;
        debug!(
            event_name = "customer.update.existing",
            customer_id = %id,
            "loaded existing customer"
        );

        customer.overwrite_from(input);
        let saved = self.repository.save(customer).await.map_err(repository_error)?;
        info!(event_name = "customer.updated", customer_id = %id, "customer updated");
        Ok(saved)
    }

    pub async fn delete_customer(&self, id: &CustomerId) -> Result<(), CustomerError> {
        let customer = self.get_customer_by_id(id).await?;
        self.repository.delete(&customer).await.map_err(repository_error)?;
        info!(event_name = "customer.deleted", customer_id = %id, "customer deleted");
        Ok(())
    }
}

fn repository_error(error: RepositoryError) -> CustomerError {
    match error {
        RepositoryError::ConstraintViolation(message) => {
            warn!(
                event_name = "customer.constraint_violation",
                reason = %message,
                "customer write rejected"
            );
            CustomerError::ConstraintViolation(message)
        }
        other => {
            error!(
                event_name = "customer.repository_error",
                error = %other,
                "customer repository error"
            );
            CustomerError::Unexpected(other.to_string())
        }
    }
}

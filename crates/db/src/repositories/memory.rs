use tokio::sync::RwLock;

use clientele_core::domain::customer::{Customer, CustomerId, NewCustomer};

use super::{CustomerRepository, RepositoryError, DUPLICATE_EMAIL, DUPLICATE_PHONE_EMAIL};

/// Non-durable store kept in insertion order. Uniqueness is checked and the
/// write applied under one write lock, matching the SQL store's guarantees.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Vec<Customer>>,
}

fn check_unique(existing: &[Customer], candidate: &Customer) -> Result<(), RepositoryError> {
    for other in existing.iter().filter(|other| other.id != candidate.id) {
        if other.email_address == candidate.email_address {
            let reason = if other.phone_number.is_some()
                && other.phone_number == candidate.phone_number
            {
                DUPLICATE_PHONE_EMAIL
            } else {
                DUPLICATE_EMAIL
            };
            return Err(RepositoryError::ConstraintViolation(reason.to_string()));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        let created = customer.with_id(CustomerId::new());
        check_unique(&customers, &created)?;
        customers.push(created.clone());
        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.clone())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|customer| &customer.id == id).cloned())
    }

    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut customers = self.customers.write().await;
        check_unique(&customers, &customer)?;
        match customers.iter_mut().find(|existing| existing.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => customers.push(customer.clone()),
        }
        Ok(customer)
    }

    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let mut customers = self.customers.write().await;
        customers.retain(|existing| existing.id != customer.id);
        Ok(())
    }
}

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use clientele_core::domain::customer::{Customer, CustomerId, NewCustomer};

use super::{CustomerRepository, RepositoryError, DUPLICATE_EMAIL, DUPLICATE_PHONE_EMAIL};
use crate::DbPool;

const CUSTOMER_COLUMNS: &str =
    "id, first_name, middle_name, last_name, email_address, phone_number";

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &SqliteRow) -> Result<Customer, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| RepositoryError::Decode(format!("customer id `{id}`: {e}")))?;

    Ok(Customer {
        id: CustomerId(id),
        first_name: row
            .try_get("first_name")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        middle_name: row
            .try_get("middle_name")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        last_name: row.try_get("last_name").map_err(|e| RepositoryError::Decode(e.to_string()))?,
        email_address: row
            .try_get("email_address")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        phone_number: row
            .try_get("phone_number")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
    })
}

/// Turns unique-index failures into [`RepositoryError::ConstraintViolation`].
fn classify_write_error(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let message = db_error.message();
            debug!(error = %message, "customer write rejected by unique index");
            let reason = if message.contains("phone_number") {
                DUPLICATE_PHONE_EMAIL
            } else {
                DUPLICATE_EMAIL
            };
            return RepositoryError::ConstraintViolation(reason.to_string());
        }
    }
    RepositoryError::Database(error)
}

#[async_trait::async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let id = CustomerId::new();
        let row = sqlx::query(&format!(
            "INSERT INTO customer ({CUSTOMER_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id.0.to_string())
        .bind(&customer.first_name)
        .bind(&customer.middle_name)
        .bind(&customer.last_name)
        .bind(&customer.email_address)
        .bind(&customer.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        row_to_customer(&row)
    }

    async fn find_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customer ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = ?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO customer ({CUSTOMER_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 first_name = excluded.first_name,
                 middle_name = excluded.middle_name,
                 last_name = excluded.last_name,
                 email_address = excluded.email_address,
                 phone_number = excluded.phone_number
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer.id.0.to_string())
        .bind(&customer.first_name)
        .bind(&customer.middle_name)
        .bind(&customer.last_name)
        .bind(&customer.email_address)
        .bind(&customer.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        row_to_customer(&row)
    }

    async fn delete(&self, customer: &Customer) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM customer WHERE id = ?")
            .bind(customer.id.0.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

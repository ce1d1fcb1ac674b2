//! Customer repository.

use sqlx::PgPool;

use super::RepositoryError;
use super::tickets::like_pattern;
use crate::models::{Customer, CustomerWithTickets, NewCustomer};

/// Repository for customer operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Customers with the number of tickets raised from their email,
    /// optionally filtered by name, email or company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        query: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CustomerWithTickets>, RepositoryError> {
        let customers = sqlx::query_as::<_, CustomerWithTickets>(
            r"
            SELECT c.id, c.name, c.email, c.phone, c.company, c.created_at,
                   count(t.id) AS ticket_count
            FROM customers c
            LEFT JOIN tickets t ON lower(t.customer_email) = lower(c.email)
            WHERE ($1::text IS NULL
                   OR c.name ILIKE $1
                   OR c.email ILIKE $1
                   OR c.company ILIKE $1)
            GROUP BY c.id
            ORDER BY c.created_at DESC
            LIMIT $2
            ",
        )
        .bind(query.map(like_pattern))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM customers")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a customer with this email exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (name, email, phone, company)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, company, created_at
            ",
        )
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_deref())
        .bind(customer.company.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "customer"))
    }
}

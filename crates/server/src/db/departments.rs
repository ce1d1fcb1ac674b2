//! Department repository.

use sqlx::PgPool;

use helpdesk_core::DepartmentId;

use super::RepositoryError;
use crate::models::{Department, DepartmentInput};

const COLUMNS: &str = "id, name, email, description, created_at, updated_at";

/// Repository for department operations.
pub struct DepartmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DepartmentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All departments, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Department>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM departments ORDER BY name");
        let departments = sqlx::query_as::<_, Department>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(departments)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DepartmentId) -> Result<Option<Department>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        Ok(department)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &DepartmentInput) -> Result<Department, RepositoryError> {
        let sql = format!(
            "INSERT INTO departments (name, email, description) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(&input.name)
            .bind(input.email.as_str())
            .bind(input.description.as_deref())
            .fetch_one(self.pool)
            .await?;

        Ok(department)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the department does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: DepartmentId,
        input: &DepartmentInput,
    ) -> Result<Department, RepositoryError> {
        let sql = format!(
            r"
            UPDATE departments
            SET name = $2, email = $3, description = $4, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        sqlx::query_as::<_, Department>(&sql)
            .bind(id.as_uuid())
            .bind(&input.name)
            .bind(input.email.as_str())
            .bind(input.description.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the department does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DepartmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

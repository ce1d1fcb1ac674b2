//! Role assignments (`user_roles`).

use sqlx::PgPool;

use helpdesk_core::{AppRole, RoleSet, UserId};

use super::RepositoryError;

/// Repository for role assignments.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All roles held by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for(&self, user_id: UserId) -> Result<RoleSet, RepositoryError> {
        let roles = sqlx::query_scalar::<_, AppRole>(
            "SELECT role FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(roles.into_iter().collect())
    }

    /// Add a role. Granting a role the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn grant(&self, user_id: UserId, role: AppRole) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            ",
        )
        .bind(user_id.as_uuid())
        .bind(role)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Replace every role the user holds with `role`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace(&self, user_id: UserId, role: AppRole) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_uuid())
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id.as_uuid())
            .bind(role)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

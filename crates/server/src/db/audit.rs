//! Append-only audit log.

use sqlx::PgPool;

use helpdesk_core::UserId;

use super::RepositoryError;

/// One audit entry.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub user_id: Option<UserId>,
    pub action: &'a str,
    pub resource_type: &'a str,
    pub resource_id: Option<String>,
    pub new_values: Option<serde_json::Value>,
}

/// Repository for `audit_logs`.
pub struct AuditRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(&self, entry: &AuditEntry<'_>) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO audit_logs (user_id, action, resource_type, resource_id, new_values)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(entry.user_id.map(|id| id.as_uuid()))
        .bind(entry.action)
        .bind(entry.resource_type)
        .bind(entry.resource_id.as_deref())
        .bind(entry.new_values.as_ref())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

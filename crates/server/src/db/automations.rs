//! Automation rule repository.
//!
//! Rules are only listed and switched on or off here; nothing executes them.

use sqlx::PgPool;

use helpdesk_core::AutomationRuleId;
use helpdesk_core::metrics::toggled;

use super::RepositoryError;
use crate::models::AutomationRule;

/// Repository for automation rules.
pub struct AutomationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AutomationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All rules, highest priority first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AutomationRule>, RepositoryError> {
        let rules = sqlx::query_as::<_, AutomationRule>(
            r"
            SELECT id, name, description, trigger_event, conditions, actions,
                   is_active, priority, created_at
            FROM automation_rules
            ORDER BY priority DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rules)
    }

    /// Flip a rule's active flag and return the new value.
    ///
    /// A missing flag counts as inactive (see [`toggled`]).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the rule does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn toggle(&self, id: AutomationRuleId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, Option<bool>>(
            "SELECT is_active FROM automation_rules WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let active = toggled(current);
        sqlx::query("UPDATE automation_rules SET is_active = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(active)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(active)
    }
}

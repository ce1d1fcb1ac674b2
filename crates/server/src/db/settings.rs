//! SLA policies and email templates shown on the settings page.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{EmailTemplate, SlaPolicy};

/// Repository for configuration rows.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sla_policies(&self) -> Result<Vec<SlaPolicy>, RepositoryError> {
        let policies = sqlx::query_as::<_, SlaPolicy>(
            r"
            SELECT id, name, description, priority, first_response_time_minutes,
                   resolution_time_minutes, business_hours_only, is_active
            FROM sla_policies
            ORDER BY first_response_time_minutes
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(policies)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_templates(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        let templates = sqlx::query_as::<_, EmailTemplate>(
            r"
            SELECT id, name, subject, body, template_type, is_active
            FROM email_templates
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(templates)
    }
}

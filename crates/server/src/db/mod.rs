//! Database operations for the help desk `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users`, `profiles`, `user_roles` - Accounts, display data and role rows
//! - `tickets`, `ticket_notes`, `ticket_activities` - Support requests and their history
//! - `customers`, `departments`, `call_records`
//! - `kb_categories`, `kb_articles`, `kb_article_versions`, `kb_article_feedback`
//! - `automation_rules`, `sla_policies`, `email_templates` - Configuration rows
//! - `audit_logs` - Append-only record of writes
//!
//! ## Views
//!
//! - `agent_performance`, `ticket_metrics` - Read-only reporting aggregates
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p helpdesk-cli -- migrate
//! ```
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, Row>`), so the crate
//! builds without a live database or an offline query cache.

pub mod audit;
pub mod automations;
pub mod calls;
pub mod customers;
pub mod departments;
pub mod knowledge_base;
pub mod profiles;
pub mod reports;
pub mod roles;
pub mod settings;
pub mod tickets;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audit::AuditRepository;
pub use automations::AutomationRepository;
pub use calls::CallRepository;
pub use customers::CustomerRepository;
pub use departments::DepartmentRepository;
pub use knowledge_base::KnowledgeBaseRepository;
pub use profiles::ProfileRepository;
pub use reports::ReportRepository;
pub use roles::RoleRepository;
pub use settings::SettingsRepository;
pub use tickets::TicketRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Normalize an optional free-text form field: trimmed, `None` when blank.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some(" Billing ")), Some("Billing".to_string()));
    }

    #[test]
    fn test_non_unique_errors_stay_database_errors() {
        let err = RepositoryError::from_unique(sqlx::Error::RowNotFound, "customer");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}

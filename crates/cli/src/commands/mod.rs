//! Command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use helpdesk_core::UnknownVariant;
use helpdesk_server::config::{ConfigError, ServerConfig};
use helpdesk_server::db::{self, RepositoryError};
use helpdesk_server::services::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}. Valid roles: super_admin, agent, light_agent, viewer")]
    InvalidRole(#[from] UnknownVariant),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("No account with email: {0}")]
    UnknownUser(String),
}

/// Connect using the server's database configuration.
///
/// # Errors
///
/// Returns an error if the configuration is missing or the database is unreachable.
pub async fn connect() -> Result<PgPool, CommandError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&config.database_url).await?)
}

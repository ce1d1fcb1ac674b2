//! Database migration command.

use sqlx::PgPool;

use helpdesk_server::MIGRATOR;

use super::CommandError;

/// Apply every pending migration embedded in the server crate.
///
/// # Errors
///
/// Returns an error if a migration fails or was modified after being applied.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Running migrations...");
    MIGRATOR.run(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}

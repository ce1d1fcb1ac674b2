//! Account management commands.

use sqlx::PgPool;

use helpdesk_core::{AppRole, Email};
use helpdesk_server::db::{RoleRepository, UserRepository};
use helpdesk_server::services::AuthService;

use super::CommandError;

/// Create an account holding `role`.
///
/// # Errors
///
/// Returns an error if the role is unknown, the email or password is rejected,
/// or the email is already registered.
pub async fn create(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> Result<(), CommandError> {
    let role: AppRole = role.parse()?;

    let user = AuthService::new(pool)
        .register(email, password, Some(name), role)
        .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        role = role.as_str(),
        "Account created"
    );
    Ok(())
}

/// Add `role` to an existing account. Already-held roles are left as they are.
///
/// # Errors
///
/// Returns an error if the role is unknown or no account has this email.
pub async fn grant(pool: &PgPool, email: &str, role: &str) -> Result<(), CommandError> {
    let role: AppRole = role.parse()?;
    let parsed = Email::parse(email).map_err(|_| CommandError::UnknownUser(email.to_owned()))?;

    let user = UserRepository::new(pool)
        .get_by_email(&parsed)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_owned()))?;

    RoleRepository::new(pool).grant(user.id, role).await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "Role granted");
    Ok(())
}

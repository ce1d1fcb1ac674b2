//! Role resolution for the signed-in user.

use sqlx::PgPool;

use helpdesk_core::{RoleResolution, RoleSet, UserId};

use crate::db::RoleRepository;

/// Fetch the roles of `user_id`.
///
/// Always resolves: a failed lookup is logged and yields the empty set, so
/// the user sees only what the least privileged role would.
#[tracing::instrument(skip(pool), fields(user_id = %user_id))]
pub async fn resolve(pool: &PgPool, user_id: UserId) -> RoleResolution {
    match RoleRepository::new(pool).roles_for(user_id).await {
        Ok(roles) => RoleResolution::Resolved(roles),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch roles; treating as none");
            RoleResolution::Resolved(RoleSet::empty())
        }
    }
}

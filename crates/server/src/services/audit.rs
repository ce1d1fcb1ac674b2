//! Best-effort audit trail for writes.

use serde::Serialize;
use sqlx::PgPool;

use helpdesk_core::UserId;

use crate::db::AuditRepository;
use crate::db::audit::AuditEntry;

/// Append an audit row. Failures are logged and never reach the caller.
pub async fn record<T: Serialize>(
    pool: &PgPool,
    user_id: Option<UserId>,
    action: &str,
    resource_type: &str,
    resource_id: Option<String>,
    new_values: &T,
) {
    let new_values = match serde_json::to_value(new_values) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, action, resource_type, "Failed to serialize audit values");
            None
        }
    };

    let entry = AuditEntry {
        user_id,
        action,
        resource_type,
        resource_id,
        new_values,
    };

    if let Err(e) = AuditRepository::new(pool).insert(&entry).await {
        tracing::warn!(error = %e, action, resource_type, "Failed to write audit log");
    }
}

//! Call record repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{CallRecord, NewCall};

const COLUMNS: &str = r"
    id, phone_number, call_type, call_status, duration_seconds,
    started_at, ended_at, agent_id, customer_id, ticket_id
";

/// Repository for call records.
pub struct CallRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CallRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The `limit` most recent calls by start time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<CallRecord>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM call_records ORDER BY started_at DESC LIMIT $1");
        let calls = sqlx::query_as::<_, CallRecord>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(calls)
    }

    /// Record an outbound call in the `initiated` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, call: &NewCall) -> Result<CallRecord, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO call_records (phone_number, call_type, call_status, duration_seconds, agent_id)
            VALUES ($1, 'outbound', 'initiated', 0, $2)
            RETURNING {COLUMNS}
            "
        );
        let call = sqlx::query_as::<_, CallRecord>(&sql)
            .bind(&call.phone_number)
            .bind(call.agent_id.map(|id| id.as_uuid()))
            .fetch_one(self.pool)
            .await?;

        Ok(call)
    }
}

//! Read-only access to the reporting views.

use chrono::NaiveDate;
use sqlx::PgPool;

use helpdesk_core::DailyMetric;

use super::RepositoryError;
use crate::models::AgentPerformance;

/// Most `ticket_metrics` rows a page shows.
pub const METRICS_LIMIT: i64 = 30;

#[derive(Debug, sqlx::FromRow)]
struct MetricRow {
    date: NaiveDate,
    total_tickets: Option<i64>,
    resolved_tickets: Option<i64>,
    avg_resolution_time_hours: Option<f64>,
    sla_breached_tickets: Option<i64>,
}

impl From<MetricRow> for DailyMetric {
    fn from(row: MetricRow) -> Self {
        Self {
            date: row.date,
            total_tickets: row.total_tickets.unwrap_or(0),
            resolved_tickets: row.resolved_tickets.unwrap_or(0),
            avg_resolution_time_hours: row.avg_resolution_time_hours,
            sla_breached_tickets: row.sla_breached_tickets.unwrap_or(0),
        }
    }
}

/// Repository for the reporting views.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Daily metrics on or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn metrics(&self, since: NaiveDate) -> Result<Vec<DailyMetric>, RepositoryError> {
        let rows = sqlx::query_as::<_, MetricRow>(
            r"
            SELECT date, total_tickets, resolved_tickets,
                   avg_resolution_time_hours, sla_breached_tickets
            FROM ticket_metrics
            WHERE date >= $1
            ORDER BY date DESC
            LIMIT $2
            ",
        )
        .bind(since)
        .bind(METRICS_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn agent_performance(&self) -> Result<Vec<AgentPerformance>, RepositoryError> {
        let rows = sqlx::query_as::<_, AgentPerformance>(
            r"
            SELECT agent_id, agent_name, total_tickets, resolved_tickets,
                   avg_resolution_time_hours, sla_met_tickets, total_notes
            FROM agent_performance
            ORDER BY total_tickets DESC NULLS LAST
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

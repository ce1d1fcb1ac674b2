//! Reports: daily ticket metrics over a selectable window and agent performance.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use helpdesk_core::{DailyMetric, ReportRange, ReportTotals};

use crate::db::ReportRepository;
use crate::middleware::RequireAuth;
use crate::models::AgentPerformance;
use crate::services::Flash;
use crate::state::AppState;

use super::layout::{Chrome, SelectOption};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    /// Selected range. Missing or unknown values fall back to the last 7 days.
    #[must_use]
    pub fn range(&self) -> ReportRange {
        self.range
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MetricView {
    pub date: String,
    pub total: i64,
    pub resolved: i64,
    pub avg_resolution: String,
    pub sla_breached: i64,
}

impl From<&DailyMetric> for MetricView {
    fn from(metric: &DailyMetric) -> Self {
        Self {
            date: metric.date.format("%b %-d").to_string(),
            total: metric.total_tickets,
            resolved: metric.resolved_tickets,
            avg_resolution: metric
                .avg_resolution_time_hours
                .map_or_else(|| "-".to_string(), |h| format!("{h:.1}h")),
            sla_breached: metric.sla_breached_tickets,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentRow {
    pub name: String,
    pub total: i64,
    pub resolved: i64,
    pub avg_resolution: String,
    pub sla_met: i64,
    pub notes: i64,
}

impl From<&AgentPerformance> for AgentRow {
    fn from(row: &AgentPerformance) -> Self {
        Self {
            name: row
                .agent_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            total: row.total_tickets.unwrap_or(0),
            resolved: row.resolved_tickets.unwrap_or(0),
            avg_resolution: row.avg_resolution_display(),
            sla_met: row.sla_met_tickets.unwrap_or(0),
            notes: row.total_notes.unwrap_or(0),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub chrome: Chrome,
    pub ranges: Vec<SelectOption>,
    pub range_label: &'static str,
    pub totals: ReportTotals,
    pub metrics: Vec<MetricView>,
    pub agents: Vec<AgentRow>,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/reports").await;
    let repo = ReportRepository::new(state.pool());
    let range = query.range();

    let metrics = match repo.metrics(range.start(Utc::now().date_naive())).await {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket metrics");
            chrome.flash(Flash::error("Error loading reports"));
            Vec::new()
        }
    };

    let agents = match repo.agent_performance().await {
        Ok(rows) => rows.iter().map(AgentRow::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load agent performance");
            chrome.flash(Flash::error("Error loading agent performance"));
            Vec::new()
        }
    };

    ReportsTemplate {
        chrome,
        ranges: SelectOption::list(
            ReportRange::ALL,
            Some(range),
            ReportRange::as_str,
            ReportRange::label,
        ),
        range_label: range.label(),
        totals: ReportTotals::compute(&metrics),
        metrics: metrics.iter().map(MetricView::from).collect(),
        agents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_defaults_to_seven_days() {
        let query = |r: Option<&str>| RangeQuery {
            range: r.map(ToOwned::to_owned),
        };
        assert_eq!(query(None).range(), ReportRange::SevenDays);
        assert_eq!(query(Some("1year")).range(), ReportRange::SevenDays);
        assert_eq!(query(Some("90days")).range(), ReportRange::NinetyDays);
    }
}

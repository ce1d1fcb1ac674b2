//! Reporting view rows.

use helpdesk_core::UserId;

/// One row of the `agent_performance` view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentPerformance {
    pub agent_id: Option<UserId>,
    pub agent_name: Option<String>,
    pub total_tickets: Option<i64>,
    pub resolved_tickets: Option<i64>,
    pub avg_resolution_time_hours: Option<f64>,
    pub sla_met_tickets: Option<i64>,
    pub total_notes: Option<i64>,
}

impl AgentPerformance {
    /// Average resolution time to one decimal place, `0` when unknown.
    #[must_use]
    pub fn avg_resolution_display(&self) -> String {
        self.avg_resolution_time_hours
            .map_or_else(|| "0".to_string(), |hours| format!("{hours:.1}"))
    }
}

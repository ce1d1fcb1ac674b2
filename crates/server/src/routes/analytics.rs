//! Analytics: status and priority distribution plus daily volume.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::instrument;

use helpdesk_core::metrics::percent_of;
use helpdesk_core::{DailyMetric, ReportRange, TicketPriority};

use crate::db::{ReportRepository, TicketRepository};
use crate::middleware::RequireAuth;
use crate::models::StatusCounts;
use crate::services::Flash;
use crate::state::AppState;

use super::dashboard::StatusBar;
use super::layout::Chrome;

/// Priority share of all tickets.
#[derive(Debug, Clone)]
pub struct PriorityBar {
    pub label: &'static str,
    pub css_class: &'static str,
    pub count: i64,
    pub percent: i64,
}

impl PriorityBar {
    #[must_use]
    pub fn distribution(counts: &[(TicketPriority, i64)]) -> Vec<Self> {
        let total: i64 = counts.iter().map(|(_, n)| n).sum();
        counts
            .iter()
            .map(|&(priority, count)| Self {
                label: priority.label(),
                css_class: priority.as_str(),
                count,
                percent: percent_of(count, total),
            })
            .collect()
    }
}

/// One day of ticket volume, scaled against the busiest day shown.
#[derive(Debug, Clone)]
pub struct VolumeDay {
    pub date: String,
    pub total: i64,
    pub resolved: i64,
    pub percent: i64,
}

impl VolumeDay {
    /// Oldest day first.
    #[must_use]
    pub fn series(metrics: &[DailyMetric]) -> Vec<Self> {
        let peak = metrics.iter().map(|m| m.total_tickets).max().unwrap_or(0);
        let mut days: Vec<Self> = metrics
            .iter()
            .map(|m| Self {
                date: m.date.format("%b %-d").to_string(),
                total: m.total_tickets,
                resolved: m.resolved_tickets,
                percent: percent_of(m.total_tickets, peak),
            })
            .collect();
        days.reverse();
        days
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub chrome: Chrome,
    pub total_tickets: i64,
    pub status_bars: Vec<StatusBar>,
    pub priority_bars: Vec<PriorityBar>,
    pub volume: Vec<VolumeDay>,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/analytics").await;
    let tickets = TicketRepository::new(state.pool());

    let counts = match tickets.status_counts().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load status counts");
            chrome.flash(Flash::error("Error loading analytics"));
            StatusCounts::default()
        }
    };

    let priorities = match tickets.priority_counts().await {
        Ok(priorities) => priorities,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load priority counts");
            chrome.flash(Flash::error("Error loading analytics"));
            Vec::new()
        }
    };

    let since = ReportRange::ThirtyDays.start(Utc::now().date_naive());
    let metrics = match ReportRepository::new(state.pool()).metrics(since).await {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket metrics");
            chrome.flash(Flash::error("Error loading ticket volume"));
            Vec::new()
        }
    };

    AnalyticsTemplate {
        chrome,
        total_tickets: counts.total(),
        status_bars: StatusBar::distribution(&counts),
        priority_bars: PriorityBar::distribution(&priorities),
        volume: VolumeDay::series(&metrics),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_priority_distribution() {
        let bars = PriorityBar::distribution(&[
            (TicketPriority::Low, 1),
            (TicketPriority::Medium, 2),
            (TicketPriority::High, 1),
            (TicketPriority::Urgent, 0),
        ]);
        let percents: Vec<_> = bars.iter().map(|b| b.percent).collect();
        assert_eq!(percents, vec![25, 50, 25, 0]);
    }

    #[test]
    fn test_volume_is_oldest_first_and_scaled_to_peak() {
        let day = |d: u32, total: i64| DailyMetric {
            date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
            total_tickets: total,
            resolved_tickets: 0,
            avg_resolution_time_hours: None,
            sla_breached_tickets: 0,
        };
        let series = VolumeDay::series(&[day(14, 4), day(13, 8)]);
        assert_eq!(series[0].date, "Mar 13");
        assert_eq!(series[0].percent, 100);
        assert_eq!(series[1].percent, 50);
    }
}

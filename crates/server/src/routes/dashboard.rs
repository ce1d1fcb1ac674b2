//! Dashboard: ticket counts, customer total and the latest tickets.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::instrument;

use helpdesk_core::TicketStatus;
use helpdesk_core::metrics::percent_of;

use crate::db::{CustomerRepository, TicketRepository};
use crate::middleware::RequireAuth;
use crate::models::StatusCounts;
use crate::services::Flash;
use crate::state::AppState;

use super::layout::Chrome;
use super::tickets::TicketListItem;

const RECENT_TICKETS: i64 = 5;

/// One bar of the status distribution.
#[derive(Debug, Clone)]
pub struct StatusBar {
    pub label: &'static str,
    pub css_class: &'static str,
    pub count: i64,
    pub percent: i64,
}

impl StatusBar {
    #[must_use]
    pub fn distribution(counts: &StatusCounts) -> Vec<Self> {
        let total = counts.total();
        TicketStatus::ALL
            .into_iter()
            .map(|status| Self {
                label: status.label(),
                css_class: status.as_str(),
                count: counts.get(status),
                percent: percent_of(counts.get(status), total),
            })
            .collect()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub total_tickets: i64,
    pub open_tickets: i64,
    pub resolved_tickets: i64,
    pub customer_count: i64,
    pub status_bars: Vec<StatusBar>,
    pub recent: Vec<TicketListItem>,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/").await;
    let tickets = TicketRepository::new(state.pool());
    let now = Utc::now();

    let counts = match tickets.status_counts().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket counts");
            chrome.flash(Flash::error("Error loading ticket counts"));
            StatusCounts::default()
        }
    };

    let customer_count = match CustomerRepository::new(state.pool()).count().await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count customers");
            chrome.flash(Flash::error("Error loading customers"));
            0
        }
    };

    let recent = match tickets.recent(RECENT_TICKETS).await {
        Ok(recent) => recent.iter().map(|t| TicketListItem::new(t, now)).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load recent tickets");
            chrome.flash(Flash::error("Error loading recent tickets"));
            Vec::new()
        }
    };

    DashboardTemplate {
        chrome,
        total_tickets: counts.total(),
        open_tickets: counts.open,
        resolved_tickets: counts.resolved + counts.closed,
        customer_count,
        status_bars: StatusBar::distribution(&counts),
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_percentages() {
        let counts = StatusCounts {
            open: 1,
            in_progress: 1,
            resolved: 2,
            closed: 0,
        };
        let bars = StatusBar::distribution(&counts);
        let percents: Vec<_> = bars.iter().map(|b| b.percent).collect();
        assert_eq!(percents, vec![25, 25, 50, 0]);
        assert_eq!(bars[1].css_class, "in-progress");
    }

    #[test]
    fn test_distribution_of_nothing() {
        let bars = StatusBar::distribution(&StatusCounts::default());
        assert!(bars.iter().all(|b| b.percent == 0));
    }
}

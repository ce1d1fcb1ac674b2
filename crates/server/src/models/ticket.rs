//! Tickets, notes and activity history.

use chrono::{DateTime, Utc};

use helpdesk_core::{
    DepartmentId, Email, TicketId, TicketNoteId, TicketPriority, TicketStatus, UserId,
};

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: TicketId,
    pub ticket_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub assigned_agent_id: Option<UserId>,
    pub department_id: Option<DepartmentId>,
    pub sla_breached: bool,
    pub tags: Vec<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TicketNote {
    pub id: TicketNoteId,
    pub ticket_id: TicketId,
    pub user_id: Option<UserId>,
    pub author_name: Option<String>,
    pub content: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TicketActivity {
    pub ticket_id: TicketId,
    pub user_id: Option<UserId>,
    pub activity_type: String,
    pub description: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub priority: TicketPriority,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub created_by: Option<UserId>,
}

/// Filters for the ticket list.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Matched case-insensitively against number, title, customer name and email.
    pub query: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

/// Ticket counts by status for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.open + self.in_progress + self.resolved + self.closed
    }

    #[must_use]
    pub const fn get(&self, status: TicketStatus) -> i64 {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Closed => self.closed,
        }
    }

    pub(crate) const fn set(&mut self, status: TicketStatus, count: i64) {
        match status {
            TicketStatus::Open => self.open = count,
            TicketStatus::InProgress => self.in_progress = count,
            TicketStatus::Resolved => self.resolved = count,
            TicketStatus::Closed => self.closed = count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.set(TicketStatus::Open, 4);
        counts.set(TicketStatus::Closed, 2);
        assert_eq!(counts.get(TicketStatus::Open), 4);
        assert_eq!(counts.get(TicketStatus::InProgress), 0);
        assert_eq!(counts.total(), 6);
    }
}

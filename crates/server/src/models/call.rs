//! Call records.

use chrono::{DateTime, Utc};

use helpdesk_core::metrics::CallSample;
use helpdesk_core::{CallRecordId, CustomerId, TicketId, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CallRecord {
    pub id: CallRecordId,
    pub phone_number: Option<String>,
    pub call_type: String,
    pub call_status: String,
    pub duration_seconds: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub agent_id: Option<UserId>,
    pub customer_id: Option<CustomerId>,
    pub ticket_id: Option<TicketId>,
}

impl CallRecord {
    #[must_use]
    pub fn sample(&self) -> CallSample<'_> {
        CallSample {
            started_at: self.started_at,
            duration_seconds: self.duration_seconds,
            call_status: &self.call_status,
        }
    }
}

/// An outbound call placed from the calls page.
///
/// Telephony is external; placing a call only records it as `initiated`.
#[derive(Debug, Clone)]
pub struct NewCall {
    pub phone_number: String,
    pub agent_id: Option<UserId>,
}

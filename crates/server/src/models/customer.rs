//! Customer records.

use chrono::{DateTime, Utc};

use helpdesk_core::{CustomerId, Email};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer row with the number of tickets filed under its email.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerWithTickets {
    #[sqlx(flatten)]
    pub customer: Customer,
    pub ticket_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub company: Option<String>,
}

//! Local user accounts.

use chrono::{DateTime, Utc};

use helpdesk_core::{Email, UserId};

/// A user account. The password hash never leaves the repository.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

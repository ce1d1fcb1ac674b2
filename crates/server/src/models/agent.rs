//! Agent profiles.

use chrono::{DateTime, Utc};

use helpdesk_core::{DepartmentId, Email, RoleSet, UserId};

/// Display data for a user, keyed by the user ID.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the agents page.
#[derive(Debug, Clone)]
pub struct AgentSummary {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub department_name: Option<String>,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

//! Departments.

use chrono::{DateTime, Utc};

use helpdesk_core::{DepartmentId, Email};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub email: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or updating a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentInput {
    pub name: String,
    pub email: Email,
    pub description: Option<String>,
}

//! Profiles and the agents listing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use helpdesk_core::{AppRole, Email, RoleSet, UserId};

use super::RepositoryError;
use crate::models::{AgentSummary, Profile};

#[derive(Debug, sqlx::FromRow)]
struct AgentRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    department_name: Option<String>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AgentRow> for AgentSummary {
    type Error = RepositoryError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let roles = row
            .roles
            .iter()
            .map(|r| r.parse::<AppRole>())
            .collect::<Result<RoleSet, _>>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            full_name: row.full_name,
            department_name: row.department_name,
            roles,
            created_at: row.created_at,
        })
    }
}

/// Repository for profile operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            SELECT id, full_name, avatar_url, department_id, created_at, updated_at
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    /// Set the display name. A blank name clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_full_name(
        &self,
        id: UserId,
        full_name: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE profiles SET full_name = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(full_name)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Every profile with its department name and held roles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email or role is invalid.
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, AgentRow>(
            r"
            SELECT p.id, u.email, p.full_name, d.name AS department_name,
                   array_remove(array_agg(ur.role::text), NULL) AS roles,
                   p.created_at
            FROM profiles p
            JOIN users u ON u.id = p.id
            LEFT JOIN departments d ON d.id = p.department_id
            LEFT JOIN user_roles ur ON ur.user_id = p.id
            GROUP BY p.id, u.email, p.full_name, d.name, p.created_at
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

//! Ticket repository: tickets, notes and the activity log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use helpdesk_core::{DepartmentId, TicketId, TicketPriority, TicketStatus, UserId};

use super::RepositoryError;
use crate::models::{NewTicket, StatusCounts, Ticket, TicketActivity, TicketFilter, TicketNote};

const TICKET_COLUMNS: &str = r"
    id, ticket_number, title, description, status, priority,
    customer_name, customer_email, customer_phone, assigned_agent_id,
    department_id, sla_breached, tags, resolved_at, created_at, updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    ticket_number: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    assigned_agent_id: Option<Uuid>,
    department_id: Option<Uuid>,
    sla_breached: bool,
    tags: Vec<String>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TicketStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let priority = row
            .priority
            .parse::<TicketPriority>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: TicketId::new(row.id),
            ticket_number: row.ticket_number,
            title: row.title,
            description: row.description,
            status,
            priority,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            assigned_agent_id: row.assigned_agent_id.map(UserId::new),
            department_id: row.department_id.map(DepartmentId::new),
            sla_breached: row.sla_breached,
            tags: row.tags,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `ILIKE` pattern matching `query` anywhere, with wildcards in the input escaped.
#[must_use]
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ticket operations.
pub struct TicketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TicketRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tickets matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status or priority is unknown.
    pub async fn list(
        &self,
        filter: &TicketFilter,
        limit: i64,
    ) -> Result<Vec<Ticket>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {TICKET_COLUMNS}
            FROM tickets
            WHERE ($1::text IS NULL
                   OR ticket_number ILIKE $1
                   OR title ILIKE $1
                   OR customer_name ILIKE $1
                   OR customer_email ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR priority = $3)
            ORDER BY created_at DESC
            LIMIT $4
            "
        );

        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(filter.query.as_deref().map(like_pattern))
            .bind(filter.status.map(TicketStatus::as_str))
            .bind(filter.priority.map(TicketPriority::as_str))
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// The `limit` most recently created tickets.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Ticket>, RepositoryError> {
        self.list(&TicketFilter::default(), limit).await
    }

    /// Ticket counts by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, count(*) FROM tickets GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let status = status
                .parse::<TicketStatus>()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            counts.set(status, count);
        }
        Ok(counts)
    }

    /// Ticket counts by priority, one entry per priority in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn priority_counts(&self) -> Result<Vec<(TicketPriority, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT priority, count(*) FROM tickets GROUP BY priority",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts: Vec<(TicketPriority, i64)> =
            TicketPriority::ALL.into_iter().map(|p| (p, 0)).collect();
        for (priority, count) in rows {
            let priority = priority
                .parse::<TicketPriority>()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            if let Some(entry) = counts.iter_mut().find(|(p, _)| *p == priority) {
                entry.1 = count;
            }
        }
        Ok(counts)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an `open` ticket and log its creation.
    ///
    /// The ticket number is assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, ticket: &NewTicket) -> Result<Ticket, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"
            INSERT INTO tickets (title, description, status, priority, customer_name,
                                 customer_email, customer_phone, department_id, created_by)
            VALUES ($1, $2, 'open', $3, $4, $5, $6, $7, $8)
            RETURNING {TICKET_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(&ticket.title)
            .bind(ticket.description.as_deref())
            .bind(ticket.priority.as_str())
            .bind(&ticket.customer_name)
            .bind(ticket.customer_email.as_str())
            .bind(ticket.customer_phone.as_deref())
            .bind(ticket.department_id.map(|id| id.as_uuid()))
            .bind(ticket.created_by.map(|id| id.as_uuid()))
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO ticket_activities (ticket_id, user_id, activity_type, description, new_value)
            VALUES ($1, $2, 'created', 'Ticket created', 'open')
            ",
        )
        .bind(row.id)
        .bind(ticket.created_by.map(|id| id.as_uuid()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// Move a ticket to `status` and log the change.
    ///
    /// Resolving stamps `resolved_at`; closing keeps an existing stamp;
    /// reopening clears it. Returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        user_id: UserId,
    ) -> Result<TicketStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_scalar::<_, String>(
            "SELECT status FROM tickets WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        let old = old
            .parse::<TicketStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        sqlx::query(
            r"
            UPDATE tickets
            SET status = $2,
                resolved_at = CASE
                    WHEN $2 = 'resolved' THEN now()
                    WHEN $2 = 'closed' THEN COALESCE(resolved_at, now())
                    ELSE NULL
                END,
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO ticket_activities
                (ticket_id, user_id, activity_type, description, old_value, new_value)
            VALUES ($1, $2, 'status_changed', $3, $4, $5)
            ",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(format!("Status changed from {} to {}", old.label(), status.label()))
        .bind(old.as_str())
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(old)
    }

    /// Notes on a ticket, oldest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn notes(&self, id: TicketId) -> Result<Vec<TicketNote>, RepositoryError> {
        let notes = sqlx::query_as::<_, TicketNote>(
            r"
            SELECT n.id, n.ticket_id, n.user_id, p.full_name AS author_name,
                   n.content, n.is_internal, n.created_at
            FROM ticket_notes n
            LEFT JOIN profiles p ON p.id = n.user_id
            WHERE n.ticket_id = $1
            ORDER BY n.created_at
            ",
        )
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(notes)
    }

    /// Add a note. The first note by an agent also stamps `first_response_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_note(
        &self,
        id: TicketId,
        user_id: UserId,
        content: &str,
        is_internal: bool,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE tickets
            SET first_response_at = COALESCE(first_response_at, now()), updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO ticket_notes (ticket_id, user_id, content, is_internal) VALUES ($1, $2, $3, $4)",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(content)
        .bind(is_internal)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO ticket_activities (ticket_id, user_id, activity_type, description)
            VALUES ($1, $2, 'note_added', $3)
            ",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(if is_internal { "Internal note added" } else { "Reply added" })
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Activity log for a ticket, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn activities(&self, id: TicketId) -> Result<Vec<TicketActivity>, RepositoryError> {
        let activities = sqlx::query_as::<_, TicketActivity>(
            r"
            SELECT ticket_id, user_id, activity_type, description, old_value, new_value, created_at
            FROM ticket_activities
            WHERE ticket_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_query() {
        assert_eq!(like_pattern("TKT-0001"), "%TKT-0001%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}

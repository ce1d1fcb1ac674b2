//! Ticket list, detail view and ticket writes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use helpdesk_core::{TicketId, TicketPriority, TicketStatus};

use crate::db::{DepartmentRepository, RepositoryError, TicketRepository, non_empty};
use crate::middleware::{RequireAuth, RequireRole, RoleRequirement, TicketWriters};
use crate::models::{Department, Ticket, TicketActivity, TicketFilter, TicketNote};
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::{NoteForm, TicketForm};
use crate::state::AppState;

use super::layout::{Chrome, SelectOption, format_datetime, time_ago};
use super::not_found;

const LIST_LIMIT: i64 = 100;

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TicketQuery {
    /// Unrecognized status or priority values are ignored.
    #[must_use]
    pub fn filter(&self) -> TicketFilter {
        TicketFilter {
            query: non_empty(self.q.as_deref()),
            status: self.status.as_deref().and_then(|s| s.parse().ok()),
            priority: self.priority.as_deref().and_then(|p| p.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

// =============================================================================
// View Types
// =============================================================================

/// A ticket as shown in lists.
#[derive(Debug, Clone)]
pub struct TicketListItem {
    pub id: String,
    pub number: String,
    pub title: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created: String,
}

impl TicketListItem {
    #[must_use]
    pub fn new(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        Self {
            id: ticket.id.to_string(),
            number: ticket.ticket_number.clone(),
            title: ticket.title.clone(),
            customer_name: ticket.customer_name.clone(),
            customer_email: ticket.customer_email.clone(),
            status: ticket.status,
            priority: ticket.priority,
            created: time_ago(ticket.created_at, now),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteView {
    pub author: String,
    pub content: String,
    pub is_internal: bool,
    pub created: String,
}

impl From<&TicketNote> for NoteView {
    fn from(note: &TicketNote) -> Self {
        Self {
            author: note
                .author_name
                .clone()
                .unwrap_or_else(|| "Unknown agent".to_string()),
            content: note.content.clone(),
            is_internal: note.is_internal,
            created: format_datetime(note.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityView {
    pub description: String,
    pub created: String,
}

impl From<&TicketActivity> for ActivityView {
    fn from(activity: &TicketActivity) -> Self {
        Self {
            description: activity
                .description
                .clone()
                .unwrap_or_else(|| activity.activity_type.replace('_', " ")),
            created: format_datetime(activity.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DepartmentOption {
    pub id: String,
    pub name: String,
}

impl From<&Department> for DepartmentOption {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id.to_string(),
            name: department.name.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "tickets/index.html")]
pub struct TicketsIndexTemplate {
    pub chrome: Chrome,
    pub tickets: Vec<TicketListItem>,
    pub search_query: String,
    pub status_options: Vec<SelectOption>,
    pub priority_options: Vec<SelectOption>,
    /// Priorities for the create form, `medium` preselected.
    pub new_priority_options: Vec<SelectOption>,
    pub departments: Vec<DepartmentOption>,
    pub can_write: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "tickets/detail.html")]
pub struct TicketDetailTemplate {
    pub chrome: Chrome,
    pub ticket: TicketListItem,
    pub description: String,
    pub customer_phone: String,
    pub sla_breached: bool,
    pub resolved_at: Option<String>,
    pub tags: Vec<String>,
    pub notes: Vec<NoteView>,
    pub activities: Vec<ActivityView>,
    pub status_options: Vec<SelectOption>,
    pub can_write: bool,
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/tickets").await;
    let filter = query.filter();
    let now = Utc::now();

    let tickets = match TicketRepository::new(state.pool())
        .list(&filter, LIST_LIMIT)
        .await
    {
        Ok(tickets) => tickets.iter().map(|t| TicketListItem::new(t, now)).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load tickets");
            chrome.flash(Flash::error("Error loading tickets"));
            Vec::new()
        }
    };

    let can_write = auth.auth.has_any_role(TicketWriters::ROLES);
    let departments = if can_write {
        match DepartmentRepository::new(state.pool()).list().await {
            Ok(departments) => departments.iter().map(DepartmentOption::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load departments for ticket form");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    TicketsIndexTemplate {
        chrome,
        tickets,
        search_query: filter.query.unwrap_or_default(),
        status_options: SelectOption::list(
            TicketStatus::ALL,
            filter.status,
            TicketStatus::as_str,
            TicketStatus::label,
        ),
        priority_options: SelectOption::list(
            TicketPriority::ALL,
            filter.priority,
            TicketPriority::as_str,
            TicketPriority::label,
        ),
        new_priority_options: SelectOption::list(
            TicketPriority::ALL,
            Some(TicketPriority::default()),
            TicketPriority::as_str,
            TicketPriority::label,
        ),
        departments,
        can_write,
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id, ticket_id = %id))]
pub async fn detail(
    auth: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<TicketId>() else {
        return not_found().into_response();
    };
    let repo = TicketRepository::new(state.pool());

    let ticket = match repo.get(id).await {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket");
            flash::push(&auth.session, Flash::error("Error loading ticket")).await;
            return Redirect::to("/tickets").into_response();
        }
    };

    let mut chrome = Chrome::new(&auth, "/tickets").await;

    let notes = match repo.notes(id).await {
        Ok(notes) => notes.iter().map(NoteView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket notes");
            chrome.flash(Flash::error("Error loading notes"));
            Vec::new()
        }
    };

    let activities = match repo.activities(id).await {
        Ok(activities) => activities.iter().map(ActivityView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load ticket activity");
            chrome.flash(Flash::error("Error loading activity"));
            Vec::new()
        }
    };

    TicketDetailTemplate {
        chrome,
        ticket: TicketListItem::new(&ticket, Utc::now()),
        description: ticket.description.clone().unwrap_or_default(),
        customer_phone: ticket.customer_phone.clone().unwrap_or_default(),
        sla_breached: ticket.sla_breached,
        resolved_at: ticket.resolved_at.map(format_datetime),
        tags: ticket.tags.clone(),
        notes,
        activities,
        status_options: SelectOption::list(
            TicketStatus::ALL,
            Some(ticket.status),
            TicketStatus::as_str,
            TicketStatus::label,
        ),
        can_write: auth.auth.has_any_role(TicketWriters::ROLES),
    }
    .into_response()
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create(
    auth: RequireRole<TicketWriters>,
    State(state): State<AppState>,
    Form(form): Form<TicketForm>,
) -> Redirect {
    let ticket = match form.validate(Some(auth.user.id)) {
        Ok(ticket) => ticket,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error creating ticket").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/tickets");
        }
    };

    match TicketRepository::new(state.pool()).create(&ticket).await {
        Ok(created) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "create",
                "ticket",
                Some(created.id.to_string()),
                &serde_json::json!({
                    "ticket_number": created.ticket_number,
                    "title": created.title,
                    "priority": created.priority,
                }),
            )
            .await;
            flash::push(
                &auth.session,
                Flash::success("Ticket created").with_description(created.ticket_number.clone()),
            )
            .await;
            Redirect::to(&format!("/tickets/{}", created.id))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create ticket");
            flash::push(&auth.session, Flash::error("Error creating ticket")).await;
            Redirect::to("/tickets")
        }
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id, ticket_id = %id))]
pub async fn update_status(
    auth: RequireRole<TicketWriters>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Ok(id) = id.parse::<TicketId>() else {
        return not_found().into_response();
    };
    let back = format!("/tickets/{id}");

    let Ok(status) = form.status.parse::<TicketStatus>() else {
        flash::push(
            &auth.session,
            Flash::error("Error updating ticket").with_description("Unknown status"),
        )
        .await;
        return Redirect::to(&back).into_response();
    };

    match TicketRepository::new(state.pool())
        .update_status(id, status, auth.user.id)
        .await
    {
        Ok(old) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "update_status",
                "ticket",
                Some(id.to_string()),
                &serde_json::json!({ "from": old, "to": status }),
            )
            .await;
            flash::push(
                &auth.session,
                Flash::success(format!("Ticket marked {}", status.label())),
            )
            .await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update ticket status");
            flash::push(&auth.session, Flash::error("Error updating ticket")).await;
        }
    }

    Redirect::to(&back).into_response()
}

#[instrument(skip_all, fields(user_id = %auth.user.id, ticket_id = %id))]
pub async fn add_note(
    auth: RequireRole<TicketWriters>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<NoteForm>,
) -> Response {
    let Ok(id) = id.parse::<TicketId>() else {
        return not_found().into_response();
    };
    let back = format!("/tickets/{id}");

    let (content, is_internal) = match form.validate() {
        Ok(note) => note,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error adding note").with_description(e.to_string()),
            )
            .await;
            return Redirect::to(&back).into_response();
        }
    };

    match TicketRepository::new(state.pool())
        .add_note(id, auth.user.id, &content, is_internal)
        .await
    {
        Ok(()) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "add_note",
                "ticket",
                Some(id.to_string()),
                &serde_json::json!({ "is_internal": is_internal }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Note added")).await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to add note");
            flash::push(&auth.session, Flash::error("Error adding note")).await;
        }
    }

    Redirect::to(&back).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filter_parses_known_values() {
        let query = TicketQuery {
            q: Some("  login ".to_string()),
            status: Some("in-progress".to_string()),
            priority: Some("urgent".to_string()),
        };
        let filter = query.filter();
        assert_eq!(filter.query.as_deref(), Some("login"));
        assert_eq!(filter.status, Some(TicketStatus::InProgress));
        assert_eq!(filter.priority, Some(TicketPriority::Urgent));
    }

    #[test]
    fn test_query_filter_ignores_unknown_values() {
        let query = TicketQuery {
            q: Some(String::new()),
            status: Some("all".to_string()),
            priority: Some("whenever".to_string()),
        };
        let filter = query.filter();
        assert!(filter.query.is_none());
        assert!(filter.status.is_none());
        assert!(filter.priority.is_none());
    }
}

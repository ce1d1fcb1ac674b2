//! Agents: every profile with its roles, and role assignment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use helpdesk_core::{AppRole, UserId};

use crate::db::{ProfileRepository, RepositoryError, RoleRepository};
use crate::middleware::{RequireAuth, RequireRole, SuperAdminOnly};
use crate::models::AgentSummary;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::state::AppState;

use super::layout::{Chrome, SelectOption, format_date};
use super::not_found;

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct AgentView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: AppRole,
    pub role_options: Vec<SelectOption>,
    pub role_labels: Vec<&'static str>,
    pub created_at: String,
}

impl From<&AgentSummary> for AgentView {
    fn from(agent: &AgentSummary) -> Self {
        Self {
            id: agent.id.to_string(),
            name: agent
                .full_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| agent.email.to_string()),
            email: agent.email.to_string(),
            department: agent.department_name.clone().unwrap_or_default(),
            role: agent.roles.primary(),
            role_options: SelectOption::list(
                AppRole::ALL,
                Some(agent.roles.primary()),
                AppRole::as_str,
                AppRole::label,
            ),
            role_labels: agent.roles.iter().map(AppRole::label).collect(),
            created_at: format_date(agent.created_at),
        }
    }
}

/// Headline counts above the agent table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleTally {
    pub total: usize,
    pub super_admins: usize,
    pub agents: usize,
    pub light_agents: usize,
}

impl RoleTally {
    #[must_use]
    pub fn count(agents: &[AgentSummary]) -> Self {
        let holding = |role| agents.iter().filter(|a| a.roles.contains(role)).count();
        Self {
            total: agents.len(),
            super_admins: holding(AppRole::SuperAdmin),
            agents: holding(AppRole::Agent),
            light_agents: holding(AppRole::LightAgent),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "agents.html")]
pub struct AgentsTemplate {
    pub chrome: Chrome,
    pub agents: Vec<AgentView>,
    pub tally: RoleTally,
    pub can_manage: bool,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/agents").await;

    let summaries = match ProfileRepository::new(state.pool()).list_agents().await {
        Ok(summaries) => summaries,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load agents");
            chrome.flash(Flash::error("Error loading agents"));
            Vec::new()
        }
    };

    AgentsTemplate {
        chrome,
        agents: summaries.iter().map(AgentView::from).collect(),
        tally: RoleTally::count(&summaries),
        can_manage: auth.auth.is_super_admin(),
    }
}

/// Replace the roles a user holds with the one selected.
#[instrument(skip_all, fields(user_id = %auth.user.id, target_id = %id))]
pub async fn update_role(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RoleForm>,
) -> Response {
    let Ok(target) = id.parse::<UserId>() else {
        return not_found().into_response();
    };

    let role = match form.role.parse::<AppRole>() {
        Ok(role) => role,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error updating role").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/agents").into_response();
        }
    };

    match RoleRepository::new(state.pool()).replace(target, role).await {
        Ok(()) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "update",
                "user_role",
                Some(target.to_string()),
                &serde_json::json!({ "role": role.as_str() }),
            )
            .await;
            flash::push(
                &auth.session,
                Flash::success("Role updated").with_description(format!("Now {}", role.label())),
            )
            .await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update role");
            flash::push(&auth.session, Flash::error("Error updating role")).await;
        }
    }

    Redirect::to("/agents").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use helpdesk_core::{Email, RoleSet};

    use super::*;

    fn summary(roles: &[AppRole]) -> AgentSummary {
        AgentSummary {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("agent@example.com").unwrap(),
            full_name: None,
            department_name: None,
            roles: roles.iter().copied().collect::<RoleSet>(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_tally() {
        let agents = [
            summary(&[AppRole::SuperAdmin, AppRole::Agent]),
            summary(&[AppRole::Agent]),
            summary(&[AppRole::Viewer]),
            summary(&[]),
        ];
        let tally = RoleTally::count(&agents);
        assert_eq!(
            tally,
            RoleTally {
                total: 4,
                super_admins: 1,
                agents: 2,
                light_agents: 0,
            }
        );
    }

    #[test]
    fn test_view_falls_back_to_email_and_viewer() {
        let view = AgentView::from(&summary(&[]));
        assert_eq!(view.name, "agent@example.com");
        assert_eq!(view.role, AppRole::Viewer);
        assert!(view.role_labels.is_empty());
    }
}

//! Automation rules: list and on/off toggle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use helpdesk_core::AutomationRuleId;

use crate::db::{AutomationRepository, RepositoryError};
use crate::middleware::{RequireAuth, RequireRole, SuperAdminOnly};
use crate::models::AutomationRule;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::state::AppState;

use super::layout::Chrome;
use super::not_found;

#[derive(Debug, Clone)]
pub struct RuleView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub trigger_event: String,
    pub action_count: usize,
    pub priority: i32,
    pub active: bool,
}

impl From<&AutomationRule> for RuleView {
    fn from(rule: &AutomationRule) -> Self {
        Self {
            id: rule.id.to_string(),
            name: rule.name.clone(),
            description: rule.description.clone().unwrap_or_default(),
            trigger_event: rule.trigger_event.replace('_', " "),
            action_count: rule.action_count(),
            priority: rule.priority,
            active: rule.active(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "automations.html")]
pub struct AutomationsTemplate {
    pub chrome: Chrome,
    pub rules: Vec<RuleView>,
    pub active_count: usize,
    pub can_toggle: bool,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/automations").await;

    let rules: Vec<RuleView> = match AutomationRepository::new(state.pool()).list().await {
        Ok(rules) => rules.iter().map(RuleView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load automation rules");
            chrome.flash(Flash::error("Error loading automation rules"));
            Vec::new()
        }
    };

    AutomationsTemplate {
        active_count: rules.iter().filter(|r| r.active).count(),
        rules,
        can_toggle: auth.auth.is_super_admin(),
        chrome,
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id, rule_id = %id))]
pub async fn toggle(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<AutomationRuleId>() else {
        return not_found().into_response();
    };

    match AutomationRepository::new(state.pool()).toggle(id).await {
        Ok(active) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "update",
                "automation_rule",
                Some(id.to_string()),
                &serde_json::json!({ "is_active": active }),
            )
            .await;
            let title = if active {
                "Rule activated"
            } else {
                "Rule deactivated"
            };
            flash::push(&auth.session, Flash::success(title)).await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle automation rule");
            flash::push(&auth.session, Flash::error("Error updating rule")).await;
        }
    }

    Redirect::to("/automations").into_response()
}

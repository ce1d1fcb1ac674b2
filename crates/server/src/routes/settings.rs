//! Settings: own profile, SLA policies and email templates.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use helpdesk_core::SessionUser;

use crate::db::{ProfileRepository, SettingsRepository, non_empty};
use crate::middleware::RequireAuth;
use crate::models::session_keys::CURRENT_USER;
use crate::models::{EmailTemplate, SlaPolicy};
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::state::AppState;

use super::layout::{Chrome, format_date};

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlaView {
    pub name: String,
    pub description: String,
    pub priority: String,
    pub first_response: String,
    pub resolution: String,
    pub business_hours_only: bool,
    pub is_active: bool,
}

impl From<&SlaPolicy> for SlaView {
    fn from(policy: &SlaPolicy) -> Self {
        Self {
            name: policy.name.clone(),
            description: policy.description.clone().unwrap_or_default(),
            priority: policy.priority.clone(),
            first_response: policy.first_response_display(),
            resolution: policy.resolution_display(),
            business_hours_only: policy.business_hours_only,
            is_active: policy.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailTemplateView {
    pub name: String,
    pub subject: String,
    pub template_type: String,
    pub is_active: bool,
}

impl From<&EmailTemplate> for EmailTemplateView {
    fn from(template: &EmailTemplate) -> Self {
        Self {
            name: template.name.clone(),
            subject: template.subject.clone(),
            template_type: template.template_type.replace('_', " "),
            is_active: template.is_active,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub chrome: Chrome,
    pub full_name: String,
    pub email: String,
    pub member_since: String,
    pub sla_policies: Vec<SlaView>,
    pub email_templates: Vec<EmailTemplateView>,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/settings").await;
    let settings = SettingsRepository::new(state.pool());

    let profile = match ProfileRepository::new(state.pool()).get(auth.user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load profile");
            chrome.flash(Flash::error("Error loading profile"));
            None
        }
    };

    let sla_policies = match settings.sla_policies().await {
        Ok(policies) => policies.iter().map(SlaView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load SLA policies");
            chrome.flash(Flash::error("Error loading SLA policies"));
            Vec::new()
        }
    };

    let email_templates = match settings.email_templates().await {
        Ok(templates) => templates.iter().map(EmailTemplateView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load email templates");
            chrome.flash(Flash::error("Error loading email templates"));
            Vec::new()
        }
    };

    SettingsTemplate {
        chrome,
        full_name: profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .unwrap_or_default(),
        email: auth.user.email.to_string(),
        member_since: profile
            .as_ref()
            .map(|p| format_date(p.created_at))
            .unwrap_or_default(),
        sla_policies,
        email_templates,
    }
}

/// Update the signed-in user's display name and the copy held in the session.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn update_profile(
    auth: RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let full_name = non_empty(form.full_name.as_deref());

    match ProfileRepository::new(state.pool())
        .update_full_name(auth.user.id, full_name.as_deref())
        .await
    {
        Ok(()) => {
            let user = SessionUser {
                full_name: full_name.clone(),
                ..auth.user.clone()
            };
            if let Err(e) = auth.session.insert(CURRENT_USER, &user).await {
                tracing::warn!(error = %e, "Failed to refresh session user");
            }
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "update",
                "profile",
                Some(auth.user.id.to_string()),
                &serde_json::json!({ "full_name": full_name }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Profile updated")).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update profile");
            flash::push(&auth.session, Flash::error("Error updating profile")).await;
        }
    }

    Redirect::to("/settings")
}

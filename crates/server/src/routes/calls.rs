//! Call log and outbound call recording.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use tracing::instrument;

use helpdesk_core::CallStats;
use helpdesk_core::metrics::format_duration;

use crate::db::CallRepository;
use crate::middleware::{RequireAuth, RequireRole, RoleRequirement, TicketWriters};
use crate::models::CallRecord;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::CallForm;
use crate::state::AppState;

use super::layout::{Chrome, format_datetime};

const RECENT_CALLS: i64 = 50;

#[derive(Debug, Clone)]
pub struct CallView {
    pub phone_number: String,
    pub call_type: String,
    pub call_status: String,
    pub duration: String,
    pub started_at: String,
}

impl From<&CallRecord> for CallView {
    fn from(call: &CallRecord) -> Self {
        Self {
            phone_number: call
                .phone_number
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            call_type: call.call_type.clone(),
            call_status: call.call_status.clone(),
            duration: format_duration(i64::from(call.duration_seconds)),
            started_at: format_datetime(call.started_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "calls.html")]
pub struct CallsTemplate {
    pub chrome: Chrome,
    pub calls: Vec<CallView>,
    pub stats: CallStats,
    pub can_call: bool,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/calls").await;

    let records = match CallRepository::new(state.pool()).recent(RECENT_CALLS).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load calls");
            chrome.flash(Flash::error("Error loading calls"));
            Vec::new()
        }
    };

    let stats = CallStats::compute(
        records.iter().map(CallRecord::sample),
        Utc::now().date_naive(),
    );

    CallsTemplate {
        chrome,
        calls: records.iter().map(CallView::from).collect(),
        stats,
        can_call: auth.auth.has_any_role(TicketWriters::ROLES),
    }
}

/// Record an outbound call. Dialing happens outside the application.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create(
    auth: RequireRole<TicketWriters>,
    State(state): State<AppState>,
    Form(form): Form<CallForm>,
) -> Redirect {
    let call = match form.validate(auth.user.id) {
        Ok(call) => call,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error placing call").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/calls");
        }
    };

    match CallRepository::new(state.pool()).create(&call).await {
        Ok(record) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "create",
                "call_record",
                Some(record.id.to_string()),
                &serde_json::json!({ "phone_number": call.phone_number }),
            )
            .await;
            flash::push(
                &auth.session,
                Flash::success("Call initiated").with_description(format!(
                    "Calling {}",
                    call.phone_number
                )),
            )
            .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to record call");
            flash::push(&auth.session, Flash::error("Error placing call")).await;
        }
    }

    Redirect::to("/calls")
}

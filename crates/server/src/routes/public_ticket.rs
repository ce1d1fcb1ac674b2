//! Public ticket submission form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use helpdesk_core::TicketPriority;

use crate::db::TicketRepository;
use crate::middleware::OptionalUser;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::TicketForm;
use crate::state::AppState;

use super::layout::SelectOption;

#[derive(Template, WebTemplate)]
#[template(path = "submit_ticket.html")]
pub struct SubmitTicketTemplate {
    pub flashes: Vec<Flash>,
    pub priority_options: Vec<SelectOption>,
}

pub async fn page(session: Session) -> impl IntoResponse {
    SubmitTicketTemplate {
        flashes: flash::take(&session).await,
        priority_options: SelectOption::list(
            TicketPriority::ALL,
            Some(TicketPriority::default()),
            TicketPriority::as_str,
            TicketPriority::label,
        ),
    }
}

/// Create an `open` ticket and show its number.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
    Form(form): Form<TicketForm>,
) -> Response {
    let created_by = user.map(|u| u.id);
    let ticket = match form.validate(created_by) {
        Ok(ticket) => ticket,
        Err(e) => {
            flash::push(
                &session,
                Flash::error("Could not submit ticket").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/submit-ticket").into_response();
        }
    };

    match TicketRepository::new(state.pool()).create(&ticket).await {
        Ok(created) => {
            tracing::info!(ticket_number = %created.ticket_number, "Public ticket submitted");
            audit::record(
                state.pool(),
                created_by,
                "create",
                "ticket",
                Some(created.id.to_string()),
                &serde_json::json!({
                    "ticket_number": created.ticket_number,
                    "title": created.title,
                    "source": "public_form",
                }),
            )
            .await;
            flash::push(
                &session,
                Flash::success("Ticket submitted").with_description(format!(
                    "Your ticket number is {}. We'll be in touch at {}.",
                    created.ticket_number, created.customer_email
                )),
            )
            .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create public ticket");
            flash::push(
                &session,
                Flash::error("Could not submit ticket").with_description("Please try again later."),
            )
            .await;
        }
    }

    Redirect::to("/submit-ticket").into_response()
}

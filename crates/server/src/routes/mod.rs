//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database ping)
//!
//! # Public
//! GET  /auth                           - Sign-in and sign-up forms
//! POST /auth/sign-in                   - Sign in
//! POST /auth/sign-up                   - Create a viewer account
//! POST /auth/sign-out                  - Sign out
//! GET  /submit-ticket                  - Public ticket form
//! POST /submit-ticket                  - Create an open ticket
//!
//! # Behind the authorization gate
//! GET  /                               - Dashboard
//! GET  /tickets                        - Ticket list (?q=&status=&priority=)
//! POST /tickets                        - Create ticket
//! GET  /tickets/{id}                   - Ticket detail
//! POST /tickets/{id}/status            - Change status
//! POST /tickets/{id}/notes             - Add note
//! GET  /customers                      - Customer list (?q=)
//! POST /customers                      - Create customer
//! GET  /knowledge-base                 - Categories and articles (?q=)
//! POST /knowledge-base/articles        - Create article
//! GET  /knowledge-base/articles/{id}   - Article
//! POST /knowledge-base/articles/{id}/feedback
//! GET  /calls                          - Call log
//! POST /calls                          - Record outbound call
//! GET  /reports                        - Reports (?range=7days|30days|90days)
//! GET  /automations                    - Automation rules
//! POST /automations/{id}/toggle        - Switch a rule on or off
//! GET  /analytics                      - Distributions and daily volume
//! GET  /departments                    - Departments
//! POST /departments                    - Create department
//! POST /departments/{id}               - Update department
//! GET  /departments/{id}/delete        - Confirm deletion
//! POST /departments/{id}/delete        - Delete (requires confirm=yes)
//! GET  /agents                         - Agents and roles
//! POST /agents/{id}/role               - Replace a user's roles
//! GET  /settings                       - Profile, SLA policies, email templates
//! POST /settings/profile               - Update own name
//! GET  /api/me                         - Current user as JSON
//! ```
//!
//! Anything else renders the not-found page.

pub mod agents;
pub mod analytics;
pub mod api;
pub mod auth;
pub mod automations;
pub mod calls;
pub mod customers;
pub mod dashboard;
pub mod departments;
pub mod knowledge_base;
pub mod layout;
pub mod public_ticket;
pub mod reports;
pub mod settings;
pub mod tickets;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

/// The `404` page.
pub fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate)
}

async fn fallback() -> impl IntoResponse {
    not_found()
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::page))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the ticket routes router.
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::index).post(tickets::create))
        .route("/{id}", get(tickets::detail))
        .route("/{id}/status", post(tickets::update_status))
        .route("/{id}/notes", post(tickets::add_note))
}

/// Create the knowledge base routes router.
pub fn knowledge_base_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(knowledge_base::index))
        .route("/articles", post(knowledge_base::create))
        .route("/articles/{id}", get(knowledge_base::article))
        .route("/articles/{id}/feedback", post(knowledge_base::feedback))
}

/// Create the department routes router.
pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(departments::index).post(departments::create))
        .route("/{id}", post(departments::update))
        .route(
            "/{id}/delete",
            get(departments::confirm_delete).post(departments::delete),
        )
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Public
        .nest("/auth", auth_routes())
        .route(
            "/submit-ticket",
            get(public_ticket::page).post(public_ticket::submit),
        )
        // Gated pages
        .route("/", get(dashboard::index))
        .nest("/tickets", ticket_routes())
        .route("/customers", get(customers::index).post(customers::create))
        .nest("/knowledge-base", knowledge_base_routes())
        .route("/calls", get(calls::index).post(calls::create))
        .route("/reports", get(reports::index))
        .route("/automations", get(automations::index))
        .route("/automations/{id}/toggle", post(automations::toggle))
        .route("/analytics", get(analytics::index))
        .nest("/departments", department_routes())
        .route("/agents", get(agents::index))
        .route("/agents/{id}/role", post(agents::update_role))
        .route("/settings", get(settings::index))
        .route("/settings/profile", post(settings::update_profile))
        // JSON
        .route("/api/me", get(api::me))
        .fallback(fallback)
}

//! Sign-in, sign-up and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use helpdesk_core::{AppRole, SessionUser};

use crate::db::{ProfileRepository, non_empty};
use crate::error::AppError;
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::User;
use crate::services::auth::MIN_PASSWORD_LENGTH;
use crate::services::flash::{self, Flash};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub flashes: Vec<Flash>,
    pub min_password_length: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign-in and sign-up forms. Signed-in visitors go straight to the dashboard.
pub async fn page(OptionalUser(user): OptionalUser, session: Session) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    AuthTemplate {
        flashes: flash::take(&session).await,
        min_password_length: MIN_PASSWORD_LENGTH,
    }
    .into_response()
}

/// Store the session principal for `user` and go to the dashboard.
async fn start_session(state: &AppState, session: &Session, user: User) -> Response {
    let full_name = match ProfileRepository::new(state.pool()).get(user.id).await {
        Ok(profile) => profile.and_then(|p| p.full_name),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to load profile at sign-in");
            None
        }
    };

    let principal = SessionUser {
        id: user.id,
        email: user.email,
        full_name,
    };

    if let Err(e) = set_current_user(session, &principal).await {
        tracing::error!(error = %e, "Failed to store session");
        flash::push(session, Flash::error("Could not sign you in. Please try again.")).await;
        return Redirect::to("/auth").into_response();
    }

    tracing::info!(user_id = %principal.id, "Signed in");
    Redirect::to("/").into_response()
}

#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => start_session(&state, &session, user).await,
        Err(e) => {
            if matches!(e, AuthError::Repository(_)) {
                tracing::error!(error = %e, "Sign-in failed");
            } else {
                tracing::info!(error = %e, "Sign-in rejected");
            }
            flash::push(&session, Flash::error("Sign in failed").with_description(e.user_message()))
                .await;
            Redirect::to("/auth").into_response()
        }
    }
}

/// Create a `viewer` account and sign it in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Response {
    let full_name = non_empty(form.full_name.as_deref());

    match AuthService::new(state.pool())
        .register(&form.email, &form.password, full_name.as_deref(), AppRole::Viewer)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Account created");
            start_session(&state, &session, user).await
        }
        Err(e) => {
            if matches!(e, AuthError::Repository(_) | AuthError::PasswordHash) {
                tracing::error!(error = %e, "Sign-up failed");
            }
            flash::push(&session, Flash::error("Sign up failed").with_description(e.user_message()))
                .await;
            Redirect::to("/auth").into_response()
        }
    }
}

/// # Errors
///
/// Returns `AppError::Session` if the session record cannot be deleted.
pub async fn sign_out(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/auth"))
}

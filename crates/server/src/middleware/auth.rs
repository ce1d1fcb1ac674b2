//! Authorization gate extractors.
//!
//! [`RequireAuth`] runs the session state machine for the request, resolves
//! the user's roles and applies the gate decision. [`RequireRole`] adds a
//! role check on top for write handlers.

use std::marker::PhantomData;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use helpdesk_core::{
    AppRole, AuthContext, GateDecision, RoleResolution, SessionStore, SessionUser,
};

use crate::db::UserRepository;
use crate::error::set_sentry_user;
use crate::models::session_keys;
use crate::services::roles;
use crate::state::AppState;

/// Seconds a loading page waits before retrying.
const LOADING_RETRY_SECONDS: &str = "2";

/// Neutral page shown while the session outcome is unknown.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate;

/// Why the gate did not admit a request.
#[derive(Debug)]
pub enum GateRejection {
    /// Session outcome unknown.
    Loading,
    /// Redirect to the sign-in page (for HTML requests).
    RedirectToSignIn,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in without the required role.
    Forbidden(&'static str),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => {
                let mut response = (StatusCode::SERVICE_UNAVAILABLE, LoadingTemplate).into_response();
                let headers = response.headers_mut();
                headers.insert(
                    header::RETRY_AFTER,
                    HeaderValue::from_static(LOADING_RETRY_SECONDS),
                );
                headers.insert(
                    header::REFRESH,
                    HeaderValue::from_static(LOADING_RETRY_SECONDS),
                );
                response
            }
            Self::RedirectToSignIn => Redirect::to("/auth").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message).into_response(),
        }
    }
}

/// Drive the session state machine from the stored session record.
///
/// A missing session layer or a failed read leaves the store `Loading`.
async fn load_session(session: Option<&Session>) -> SessionStore {
    let mut store = SessionStore::new();
    if let Err(e) = store.begin() {
        tracing::error!(error = %e, "Fresh session store refused to begin");
        return store;
    }

    let Some(session) = session else {
        tracing::error!("Session layer missing from request");
        return store;
    };

    match session.get::<SessionUser>(session_keys::CURRENT_USER).await {
        Ok(user) => {
            if let Err(e) = store.resolve(user) {
                tracing::error!(error = %e, "Session store refused to resolve");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session; leaving it loading");
        }
    }
    store
}

/// Build the authorization context for a request.
///
/// A signed-in user whose account no longer exists is signed out.
pub async fn auth_context(parts: &Parts, state: &AppState) -> AuthContext {
    let session = parts.extensions.get::<Session>();
    let mut store = load_session(session).await;

    let Some(user_id) = store.state().user().map(|u| u.id) else {
        return AuthContext::new(store.into_state(), RoleResolution::default());
    };

    match UserRepository::new(state.pool()).get_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            if let Ok(user) = store.invalidate() {
                tracing::info!(user_id = %user.id, "Account gone; invalidating session");
            }
            if let Some(session) = session
                && let Err(e) = session.flush().await
            {
                tracing::warn!(error = %e, "Failed to flush invalidated session");
            }
            return AuthContext::new(store.into_state(), RoleResolution::default());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to verify session user; keeping session");
        }
    }

    let roles = roles::resolve(state.pool(), user_id).await;
    AuthContext::new(store.into_state(), roles)
}

/// Extractor that requires a signed-in user.
///
/// Loading sessions get the loading page, anonymous HTML requests are
/// redirected to `/auth`, and anonymous API requests get `401`.
pub struct RequireAuth {
    pub user: SessionUser,
    pub auth: AuthContext,
    pub session: Session,
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = auth_context(parts, state).await;

        let user = match auth.gate() {
            GateDecision::Loading => return Err(GateRejection::Loading),
            GateDecision::RedirectToSignIn => {
                return Err(if parts.uri.path().starts_with("/api/") {
                    GateRejection::Unauthorized
                } else {
                    GateRejection::RedirectToSignIn
                });
            }
            GateDecision::Admit(user) => user.clone(),
        };

        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(GateRejection::Loading)?;

        set_sentry_user(&user.id.to_string(), user.email.as_str());

        Ok(Self {
            user,
            auth,
            session,
        })
    }
}

/// A set of roles allowed to perform an action.
pub trait RoleRequirement {
    const ROLES: &'static [AppRole];
    const MESSAGE: &'static str;
}

/// Departments, agents and automations.
pub struct SuperAdminOnly;

impl RoleRequirement for SuperAdminOnly {
    const ROLES: &'static [AppRole] = &[AppRole::SuperAdmin];
    const MESSAGE: &'static str = "Only super admins can perform this action";
}

/// Customers and knowledge base articles.
pub struct Staff;

impl RoleRequirement for Staff {
    const ROLES: &'static [AppRole] = &[AppRole::SuperAdmin, AppRole::Agent];
    const MESSAGE: &'static str = "Only agents can perform this action";
}

/// Tickets, notes and calls.
pub struct TicketWriters;

impl RoleRequirement for TicketWriters {
    const ROLES: &'static [AppRole] = &[AppRole::SuperAdmin, AppRole::Agent, AppRole::LightAgent];
    const MESSAGE: &'static str = "Viewers cannot perform this action";
}

/// Extractor that requires a signed-in user holding one of `R::ROLES`.
pub struct RequireRole<R> {
    pub user: SessionUser,
    pub auth: AuthContext,
    pub session: Session,
    _requirement: PhantomData<R>,
}

impl<R> FromRequestParts<AppState> for RequireRole<R>
where
    R: RoleRequirement + Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth {
            user,
            auth,
            session,
        } = RequireAuth::from_request_parts(parts, state).await?;

        if !auth.has_any_role(R::ROLES) {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Role check failed");
            return Err(GateRejection::Forbidden(R::MESSAGE));
        }

        Ok(Self {
            user,
            auth,
            session,
            _requirement: PhantomData,
        })
    }
}

impl<R> RequireRole<R> {
    /// Drop the role marker, e.g. to build page chrome.
    #[must_use]
    pub fn into_auth(self) -> RequireAuth {
        RequireAuth {
            user: self.user,
            auth: self.auth,
            session: self.session,
        }
    }
}

/// Extractor that optionally gets the signed-in user from the session.
///
/// Never rejects; public pages use it to adapt to a signed-in visitor.
pub struct OptionalUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store = load_session(parts.extensions.get::<Session>()).await;
        Ok(Self(store.into_state().user().cloned()))
    }
}

/// Store the signed-in user, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &SessionUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// End the session (sign out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use tower_sessions::MemoryStore;

    use helpdesk_core::{Email, SessionState, UserId};

    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("m.chen@example.com").unwrap(),
            full_name: Some("Mei Chen".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_session_layer_stays_loading() {
        let store = load_session(None).await;
        assert_eq!(store.state(), &SessionState::Loading);
    }

    #[tokio::test]
    async fn test_empty_session_is_unauthenticated() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = load_session(Some(&session)).await;
        assert_eq!(store.state(), &SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_stored_user_is_authenticated() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let u = user();
        session.insert(session_keys::CURRENT_USER, &u).await.unwrap();
        let store = load_session(Some(&session)).await;
        assert_eq!(store.state(), &SessionState::Authenticated(u));
    }

    #[tokio::test]
    async fn test_loading_rejection_never_redirects() {
        let response = GateRejection::Loading.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::LOCATION).is_none());
        assert_eq!(response.headers().get(header::REFRESH).unwrap(), "2");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Loading"));
    }

    #[test]
    fn test_redirect_rejection_goes_to_sign_in() {
        let response = GateRejection::RedirectToSignIn.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth");
    }

    #[test]
    fn test_forbidden_rejection() {
        let response = GateRejection::Forbidden(SuperAdminOnly::MESSAGE).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_role_requirements() {
        assert!(!Staff::ROLES.contains(&AppRole::LightAgent));
        assert!(TicketWriters::ROLES.contains(&AppRole::LightAgent));
        assert!(!TicketWriters::ROLES.contains(&AppRole::Viewer));
        assert_eq!(SuperAdminOnly::ROLES, &[AppRole::SuperAdmin]);
    }
}

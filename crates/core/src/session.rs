//! Session state machine.
//!
//! The server drives one [`SessionStore`] per request:
//!
//! ```text
//! Uninitialized --begin--> Loading --resolve(Some)--> Authenticated(user)
//!                                  --resolve(None)--> Unauthenticated
//! Authenticated --sign_out / invalidate--> Unauthenticated
//! ```
//!
//! There is no timeout out of `Loading`. A store that never resolves stays
//! loading, and the gate keeps rendering the loading page for it.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// The authenticated principal kept in the session record.
///
/// Roles are deliberately absent; they are resolved on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
}

impl SessionUser {
    /// Name to show in the header, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(SessionUser),
    Unauthenticated,
}

impl SessionState {
    /// Whether the session outcome is still unknown.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

/// An operation was attempted from a state that does not allow it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} while session is {from}")]
pub struct TransitionError {
    pub action: &'static str,
    pub from: &'static str,
}

/// Owner of a [`SessionState`]; the only way to change it.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    /// A fresh, uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the store, returning its state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Start loading the session.
    ///
    /// # Errors
    ///
    /// Fails unless the store is `Uninitialized`.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Uninitialized => {
                self.state = SessionState::Loading;
                Ok(())
            }
            ref other => Err(TransitionError {
                action: "begin",
                from: other.name(),
            }),
        }
    }

    /// Settle a loading session with the stored principal, if there was one.
    ///
    /// # Errors
    ///
    /// Fails unless the store is `Loading`.
    pub fn resolve(&mut self, user: Option<SessionUser>) -> Result<(), TransitionError> {
        if !matches!(self.state, SessionState::Loading) {
            return Err(TransitionError {
                action: "resolve",
                from: self.state.name(),
            });
        }
        self.state = user.map_or(SessionState::Unauthenticated, SessionState::Authenticated);
        Ok(())
    }

    /// The user signed out.
    ///
    /// # Errors
    ///
    /// Fails unless the store is `Authenticated`.
    pub fn sign_out(&mut self) -> Result<SessionUser, TransitionError> {
        self.end("sign out")
    }

    /// The session was invalidated elsewhere (expired record, deleted user).
    ///
    /// # Errors
    ///
    /// Fails unless the store is `Authenticated`.
    pub fn invalidate(&mut self) -> Result<SessionUser, TransitionError> {
        self.end("invalidate")
    }

    fn end(&mut self, action: &'static str) -> Result<SessionUser, TransitionError> {
        match std::mem::replace(&mut self.state, SessionState::Unauthenticated) {
            SessionState::Authenticated(user) => Ok(user),
            other => {
                let from = other.name();
                self.state = other;
                Err(TransitionError { action, from })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("agent@example.com").unwrap(),
            full_name: Some("Sarah Johnson".to_string()),
        }
    }

    #[test]
    fn test_happy_path() {
        let mut store = SessionStore::new();
        assert_eq!(store.state(), &SessionState::Uninitialized);
        store.begin().unwrap();
        assert!(store.state().is_pending());
        let u = user();
        store.resolve(Some(u.clone())).unwrap();
        assert_eq!(store.state().user(), Some(&u));
        assert_eq!(store.sign_out().unwrap(), u);
        assert_eq!(store.state(), &SessionState::Unauthenticated);
    }

    #[test]
    fn test_resolve_without_user() {
        let mut store = SessionStore::new();
        store.begin().unwrap();
        store.resolve(None).unwrap();
        assert_eq!(store.state(), &SessionState::Unauthenticated);
    }

    #[test]
    fn test_resolve_requires_loading() {
        let mut store = SessionStore::new();
        let err = store.resolve(None).unwrap_err();
        assert_eq!(err.from, "uninitialized");
        assert_eq!(store.state(), &SessionState::Uninitialized);
    }

    #[test]
    fn test_begin_twice_fails() {
        let mut store = SessionStore::new();
        store.begin().unwrap();
        assert!(store.begin().is_err());
        assert_eq!(store.state(), &SessionState::Loading);
    }

    #[test]
    fn test_sign_out_when_not_signed_in_leaves_state() {
        let mut store = SessionStore::new();
        store.begin().unwrap();
        let err = store.sign_out().unwrap_err();
        assert_eq!(err.to_string(), "cannot sign out while session is loading");
        assert_eq!(store.state(), &SessionState::Loading);
    }

    #[test]
    fn test_invalidate() {
        let mut store = SessionStore::new();
        store.begin().unwrap();
        store.resolve(Some(user())).unwrap();
        store.invalidate().unwrap();
        assert!(store.invalidate().is_err());
        assert_eq!(store.into_state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut u = user();
        assert_eq!(u.display_name(), "Sarah Johnson");
        u.full_name = Some("  ".to_string());
        assert_eq!(u.display_name(), "agent@example.com");
        u.full_name = None;
        assert_eq!(u.display_name(), "agent@example.com");
    }
}

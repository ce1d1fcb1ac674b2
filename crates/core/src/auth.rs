//! Authorization context and gate decisions.
//!
//! An [`AuthContext`] is built once per request from the session state and
//! the role lookup. Pages receive it explicitly; nothing reads auth state
//! from a global.

use crate::session::{SessionState, SessionUser};
use crate::types::{AppRole, RoleSet};

/// Progress of the role lookup for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleResolution {
    /// Roles have not been fetched yet.
    #[default]
    Loading,
    /// Roles are known. A failed fetch resolves to an empty set.
    Resolved(RoleSet),
}

impl RoleResolution {
    /// The resolved set, or `None` while loading.
    #[must_use]
    pub const fn roles(&self) -> Option<&RoleSet> {
        match self {
            Self::Loading => None,
            Self::Resolved(roles) => Some(roles),
        }
    }
}

/// What the gate does with a request for a protected page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<'a> {
    /// Session outcome unknown: render the loading page, never the content,
    /// never a redirect.
    Loading,
    /// Resolved with no user.
    RedirectToSignIn,
    /// Resolved with a user.
    Admit(&'a SessionUser),
}

/// Session state plus role resolution for one request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub session: SessionState,
    pub roles: RoleResolution,
}

impl AuthContext {
    #[must_use]
    pub const fn new(session: SessionState, roles: RoleResolution) -> Self {
        Self { session, roles }
    }

    /// Admission decision for a protected route.
    #[must_use]
    pub const fn gate(&self) -> GateDecision<'_> {
        match &self.session {
            SessionState::Uninitialized | SessionState::Loading => GateDecision::Loading,
            SessionState::Unauthenticated => GateDecision::RedirectToSignIn,
            SessionState::Authenticated(user) => GateDecision::Admit(user),
        }
    }

    /// The signed-in user, if the session resolved to one.
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        self.session.user()
    }

    /// True iff roles are resolved and contain `role`. False while loading.
    #[must_use]
    pub fn has_role(&self, role: AppRole) -> bool {
        self.roles.roles().is_some_and(|roles| roles.contains(role))
    }

    /// Label-based variant of [`Self::has_role`]. Unknown labels are never held.
    #[must_use]
    pub fn has_role_label(&self, label: &str) -> bool {
        label
            .parse::<AppRole>()
            .is_ok_and(|role| self.has_role(role))
    }

    /// True iff any of `roles` is held.
    #[must_use]
    pub fn has_any_role(&self, roles: &[AppRole]) -> bool {
        self.roles
            .roles()
            .is_some_and(|held| held.contains_any(roles))
    }

    /// Whether admin-only controls and nav entries are shown.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.has_role(AppRole::SuperAdmin)
    }

    /// Single role to display for the current user.
    #[must_use]
    pub fn primary_role(&self) -> AppRole {
        self.roles
            .roles()
            .map_or(AppRole::Viewer, RoleSet::primary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Email, UserId};

    fn user() -> SessionUser {
        SessionUser {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("m.chen@example.com").unwrap(),
            full_name: None,
        }
    }

    fn resolved(roles: &[AppRole]) -> RoleResolution {
        RoleResolution::Resolved(roles.iter().copied().collect())
    }

    #[test]
    fn test_pending_sessions_only_load() {
        for session in [SessionState::Uninitialized, SessionState::Loading] {
            let ctx = AuthContext::new(session, resolved(&[AppRole::SuperAdmin]));
            assert_eq!(ctx.gate(), GateDecision::Loading);
        }
    }

    #[test]
    fn test_unauthenticated_redirects() {
        let ctx = AuthContext::new(SessionState::Unauthenticated, RoleResolution::Loading);
        assert_eq!(ctx.gate(), GateDecision::RedirectToSignIn);
        assert!(ctx.user().is_none());
    }

    #[test]
    fn test_authenticated_admits() {
        let u = user();
        let ctx = AuthContext::new(SessionState::Authenticated(u.clone()), RoleResolution::Loading);
        assert_eq!(ctx.gate(), GateDecision::Admit(&u));
    }

    #[test]
    fn test_has_role_matches_membership() {
        let sets: [&[AppRole]; 4] = [
            &[],
            &[AppRole::Viewer],
            &[AppRole::Agent, AppRole::LightAgent],
            &AppRole::ALL,
        ];
        for set in sets {
            let ctx = AuthContext::new(SessionState::Authenticated(user()), resolved(set));
            for role in AppRole::ALL {
                assert_eq!(ctx.has_role(role), set.contains(&role), "{role} in {set:?}");
                assert_eq!(ctx.has_role_label(role.as_str()), set.contains(&role));
            }
        }
    }

    #[test]
    fn test_has_role_false_while_loading() {
        let ctx = AuthContext::new(SessionState::Authenticated(user()), RoleResolution::Loading);
        for role in AppRole::ALL {
            assert!(!ctx.has_role(role));
        }
        assert!(!ctx.has_any_role(&AppRole::ALL));
        assert_eq!(ctx.primary_role(), AppRole::Viewer);
    }

    #[test]
    fn test_unknown_label_is_never_held() {
        let ctx = AuthContext::new(
            SessionState::Authenticated(user()),
            resolved(&AppRole::ALL),
        );
        assert!(!ctx.has_role_label("owner"));
    }

    #[test]
    fn test_failed_fetch_is_least_privileged() {
        let ctx = AuthContext::new(
            SessionState::Authenticated(user()),
            RoleResolution::Resolved(RoleSet::empty()),
        );
        assert!(!ctx.is_super_admin());
        assert_eq!(ctx.primary_role(), AppRole::Viewer);
    }
}

//! Application roles and role sets.

use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// What was being parsed (e.g. "role", "ticket status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Role label assigned to a user.
///
/// Variants are declared from least to most privileged, so the derived
/// `Ord` is the precedence order used when a single role must be shown:
/// `super_admin > agent > light_agent > viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "app_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Read-only access to dashboards and lists.
    Viewer,
    /// Works tickets but cannot manage customers or articles.
    LightAgent,
    /// Full support agent.
    Agent,
    /// Administers departments, agents and automations.
    SuperAdmin,
}

impl AppRole {
    /// Every role, most privileged first.
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Agent, Self::LightAgent, Self::Viewer];

    /// Database label for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Agent => "agent",
            Self::LightAgent => "light_agent",
            Self::Viewer => "viewer",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Agent => "Agent",
            Self::LightAgent => "Light Agent",
            Self::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

/// The set of roles a user holds.
///
/// A user may have zero, one or several role rows. Iteration order is
/// least to most privileged and never depends on row insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet(BTreeSet<AppRole>);

impl RoleSet {
    /// An empty role set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether the set contains `role`.
    #[must_use]
    pub fn contains(&self, role: AppRole) -> bool {
        self.0.contains(&role)
    }

    /// Whether the set contains any of `roles`.
    #[must_use]
    pub fn contains_any(&self, roles: &[AppRole]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    /// Add a role, returning whether it was newly inserted.
    pub fn insert(&mut self, role: AppRole) -> bool {
        self.0.insert(role)
    }

    /// Whether the user holds no roles at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct roles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The highest-privilege role, or [`AppRole::Viewer`] when none are held.
    #[must_use]
    pub fn primary(&self) -> AppRole {
        self.0.last().copied().unwrap_or(AppRole::Viewer)
    }

    /// Iterate roles from least to most privileged.
    pub fn iter(&self) -> impl Iterator<Item = AppRole> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<AppRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = AppRole>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_labels() {
        for role in AppRole::ALL {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
        assert!("admin".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_precedence_order() {
        assert!(AppRole::SuperAdmin > AppRole::Agent);
        assert!(AppRole::Agent > AppRole::LightAgent);
        assert!(AppRole::LightAgent > AppRole::Viewer);
    }

    #[test]
    fn test_primary_ignores_insertion_order() {
        let a: RoleSet = [AppRole::Viewer, AppRole::SuperAdmin, AppRole::Agent]
            .into_iter()
            .collect();
        let b: RoleSet = [AppRole::Agent, AppRole::Viewer, AppRole::SuperAdmin]
            .into_iter()
            .collect();
        assert_eq!(a.primary(), AppRole::SuperAdmin);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_set_displays_as_viewer() {
        assert_eq!(RoleSet::empty().primary(), AppRole::Viewer);
        assert!(!RoleSet::empty().contains(AppRole::Viewer));
    }

    #[test]
    fn test_contains_any() {
        let roles: RoleSet = [AppRole::LightAgent].into_iter().collect();
        assert!(roles.contains_any(&[AppRole::Agent, AppRole::LightAgent]));
        assert!(!roles.contains_any(&[AppRole::SuperAdmin, AppRole::Agent]));
        assert!(!roles.contains_any(&[]));
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppRole::LightAgent).unwrap(),
            "\"light_agent\""
        );
    }
}

//! The route table.
//!
//! Every page the server renders is listed here with its access level and
//! sidebar entry. The server checks its router against this table in tests,
//! and the sidebar is built from it, so the two cannot drift apart.

use crate::auth::AuthContext;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session.
    Public,
    /// Behind the authorization gate.
    Protected,
}

/// Sidebar entry for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    /// Only shown to `super_admin`. The route itself stays reachable.
    pub admin_only: bool,
}

/// A page in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub path: &'static str,
    pub title: &'static str,
    pub access: Access,
    pub nav: Option<NavItem>,
}

const fn nav(label: &'static str) -> Option<NavItem> {
    Some(NavItem {
        label,
        admin_only: false,
    })
}

const fn admin_nav(label: &'static str) -> Option<NavItem> {
    Some(NavItem {
        label,
        admin_only: true,
    })
}

/// All routes, in sidebar order.
pub const ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: "/auth",
        title: "Sign In",
        access: Access::Public,
        nav: None,
    },
    RouteSpec {
        path: "/submit-ticket",
        title: "Submit a Ticket",
        access: Access::Public,
        nav: None,
    },
    RouteSpec {
        path: "/",
        title: "Dashboard",
        access: Access::Protected,
        nav: nav("Dashboard"),
    },
    RouteSpec {
        path: "/tickets",
        title: "Tickets",
        access: Access::Protected,
        nav: nav("Tickets"),
    },
    RouteSpec {
        path: "/customers",
        title: "Customers",
        access: Access::Protected,
        nav: nav("Customers"),
    },
    RouteSpec {
        path: "/knowledge-base",
        title: "Knowledge Base",
        access: Access::Protected,
        nav: nav("Knowledge Base"),
    },
    RouteSpec {
        path: "/calls",
        title: "Calls",
        access: Access::Protected,
        nav: nav("Calls"),
    },
    RouteSpec {
        path: "/reports",
        title: "Reports",
        access: Access::Protected,
        nav: nav("Reports"),
    },
    RouteSpec {
        path: "/automations",
        title: "Automations",
        access: Access::Protected,
        nav: nav("Automations"),
    },
    RouteSpec {
        path: "/analytics",
        title: "Analytics",
        access: Access::Protected,
        nav: nav("Analytics"),
    },
    RouteSpec {
        path: "/departments",
        title: "Departments",
        access: Access::Protected,
        nav: admin_nav("Departments"),
    },
    RouteSpec {
        path: "/agents",
        title: "Agents",
        access: Access::Protected,
        nav: admin_nav("Agents"),
    },
    RouteSpec {
        path: "/settings",
        title: "Settings",
        access: Access::Protected,
        nav: nav("Settings"),
    },
];

/// Result of looking a path up in [`ROUTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Found(&'static RouteSpec),
    NotFound,
}

impl RouteMatch {
    /// Whether the matched route is behind the gate.
    #[must_use]
    pub fn is_protected(self) -> bool {
        matches!(self, Self::Found(spec) if spec.access == Access::Protected)
    }
}

/// Find the route owning `path`.
///
/// Sub-paths belong to their section (`/tickets/{id}` resolves to
/// `/tickets`). Query strings and a trailing slash are ignored.
#[must_use]
pub fn resolve(path: &str) -> RouteMatch {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    ROUTES
        .iter()
        .find(|spec| {
            path == spec.path
                || (spec.path != "/"
                    && path
                        .strip_prefix(spec.path)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
        .map_or(RouteMatch::NotFound, RouteMatch::Found)
}

/// Sidebar entries visible to the current user.
///
/// Admin-only entries require a resolved `super_admin` role, so they stay
/// hidden while roles are loading.
#[must_use]
pub fn nav_items(ctx: &AuthContext) -> Vec<(&'static RouteSpec, NavItem)> {
    let is_admin = ctx.is_super_admin();
    ROUTES
        .iter()
        .filter_map(|spec| spec.nav.map(|item| (spec, item)))
        .filter(|(_, item)| !item.admin_only || is_admin)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RoleResolution;
    use crate::session::SessionState;
    use crate::types::AppRole;

    const PROTECTED: &[&str] = &[
        "/",
        "/tickets",
        "/customers",
        "/knowledge-base",
        "/calls",
        "/reports",
        "/automations",
        "/analytics",
        "/departments",
        "/agents",
        "/settings",
    ];

    #[test]
    fn test_protected_routes_resolve_as_protected() {
        for path in PROTECTED {
            assert!(resolve(path).is_protected(), "{path}");
        }
    }

    #[test]
    fn test_public_routes() {
        for path in ["/auth", "/submit-ticket"] {
            assert!(matches!(resolve(path), RouteMatch::Found(spec) if spec.access == Access::Public));
        }
    }

    #[test]
    fn test_sub_paths_belong_to_section() {
        assert!(matches!(
            resolve("/tickets/67e55044-10b1-426f-9247-bb680e5fe0c8"),
            RouteMatch::Found(spec) if spec.path == "/tickets"
        ));
        assert!(matches!(resolve("/reports/?range=7days"), RouteMatch::Found(spec) if spec.path == "/reports"));
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        for path in ["/nope", "/ticketsx", "/admin", "/knowledge"] {
            assert_eq!(resolve(path), RouteMatch::NotFound, "{path}");
        }
    }

    #[test]
    fn test_admin_nav_hidden_without_super_admin() {
        let agent = AuthContext::new(
            SessionState::Unauthenticated,
            RoleResolution::Resolved([AppRole::Agent].into_iter().collect()),
        );
        let labels: Vec<_> = nav_items(&agent).iter().map(|(_, n)| n.label).collect();
        assert!(!labels.contains(&"Departments"));
        assert!(!labels.contains(&"Agents"));
        assert!(labels.contains(&"Tickets"));

        let loading = AuthContext::new(SessionState::Loading, RoleResolution::Loading);
        assert!(nav_items(&loading).iter().all(|(_, n)| !n.admin_only));
    }

    #[test]
    fn test_admin_nav_shown_for_super_admin() {
        let admin = AuthContext::new(
            SessionState::Unauthenticated,
            RoleResolution::Resolved([AppRole::SuperAdmin].into_iter().collect()),
        );
        let labels: Vec<_> = nav_items(&admin).iter().map(|(_, n)| n.label).collect();
        assert!(labels.contains(&"Departments"));
        assert!(labels.contains(&"Agents"));
    }

    #[test]
    fn test_public_routes_have_no_nav() {
        for spec in ROUTES {
            if spec.access == Access::Public {
                assert!(spec.nav.is_none(), "{}", spec.path);
            }
        }
    }
}

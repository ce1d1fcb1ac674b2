//! Page chrome shared by every signed-in page: header, sidebar and flashes.

use chrono::{DateTime, Utc};
use tower_sessions::Session;

use helpdesk_core::routes::{RouteMatch, nav_items, resolve};
use helpdesk_core::{AuthContext, SessionUser};

use crate::middleware::RequireAuth;
use crate::services::flash::{self, Flash};

/// Sidebar link.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Everything `base.html` needs.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: &'static str,
    pub user_name: String,
    pub user_email: String,
    pub initials: String,
    pub role_label: &'static str,
    pub nav: Vec<NavLink>,
    pub flashes: Vec<Flash>,
    pub is_super_admin: bool,
}

impl Chrome {
    /// Build the chrome for `path`, taking pending flashes out of the session.
    pub async fn new(auth: &RequireAuth, path: &str) -> Self {
        Self::build(&auth.user, &auth.auth, &auth.session, path).await
    }

    async fn build(user: &SessionUser, ctx: &AuthContext, session: &Session, path: &str) -> Self {
        let current = match resolve(path) {
            RouteMatch::Found(spec) => Some(spec),
            RouteMatch::NotFound => None,
        };

        let nav = nav_items(ctx)
            .into_iter()
            .map(|(spec, item)| NavLink {
                label: item.label,
                path: spec.path,
                active: current.is_some_and(|c| c.path == spec.path),
            })
            .collect();

        Self {
            title: current.map_or("Not Found", |spec| spec.title),
            user_name: user.display_name().to_string(),
            user_email: user.email.to_string(),
            initials: initials(user),
            role_label: ctx.primary_role().label(),
            nav,
            flashes: flash::take(session).await,
            is_super_admin: ctx.is_super_admin(),
        }
    }

    /// Show an extra notification on this render.
    pub fn flash(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SelectOption {
    /// Options for `items`, marking the one equal to `current`.
    #[must_use]
    pub fn list<T, I>(
        items: I,
        current: Option<T>,
        value: fn(T) -> &'static str,
        label: fn(T) -> &'static str,
    ) -> Vec<Self>
    where
        T: Copy + PartialEq,
        I: IntoIterator<Item = T>,
    {
        items
            .into_iter()
            .map(|item| Self {
                value: value(item),
                label: label(item),
                selected: current == Some(item),
            })
            .collect()
    }
}

/// Avatar initials: first letters of the first two name words, or from the email.
#[must_use]
pub fn initials(user: &SessionUser) -> String {
    let from_name: String = user
        .full_name
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if from_name.is_empty() {
        user.email.initials()
    } else {
        from_name
    }
}

/// Relative time for lists ("5 minutes ago").
#[must_use]
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    let (n, unit) = match seconds {
        0..60 => return "just now".to_string(),
        60..3_600 => (seconds / 60, "minute"),
        3_600..86_400 => (seconds / 3_600, "hour"),
        86_400..2_592_000 => (seconds / 86_400, "day"),
        _ => return format_date(at),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Calendar date for tables.
#[must_use]
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Date and time for detail views.
#[must_use]
pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M UTC").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use helpdesk_core::{Email, UserId};

    use super::*;

    fn user(full_name: Option<&str>) -> SessionUser {
        SessionUser {
            id: UserId::new(uuid::Uuid::new_v4()),
            email: Email::parse("mei.chen@example.com").unwrap(),
            full_name: full_name.map(ToString::to_string),
        }
    }

    #[test]
    fn test_select_option_marks_current() {
        use helpdesk_core::TicketStatus;

        let options = SelectOption::list(
            TicketStatus::ALL,
            Some(TicketStatus::Resolved),
            TicketStatus::as_str,
            TicketStatus::label,
        );
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["resolved"]);

        let none = SelectOption::list(TicketStatus::ALL, None, TicketStatus::as_str, TicketStatus::label);
        assert!(none.iter().all(|o| !o.selected));
    }

    #[test]
    fn test_initials_from_name() {
        assert_eq!(initials(&user(Some("mei ling chen"))), "ML");
        assert_eq!(initials(&user(Some("Sam"))), "S");
    }

    #[test]
    fn test_initials_fall_back_to_email() {
        assert_eq!(initials(&user(None)), user(None).email.initials());
        assert_eq!(initials(&user(Some("  "))), user(None).email.initials());
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago(now - Duration::days(60), now), "Jan 13, 2025");
        assert_eq!(time_ago(now + Duration::minutes(5), now), "just now");
    }
}

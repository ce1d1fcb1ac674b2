//! SLA policies and email templates shown on the settings page.

use helpdesk_core::{EmailTemplateId, SlaPolicyId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SlaPolicy {
    pub id: SlaPolicyId,
    pub name: String,
    pub description: Option<String>,
    pub priority: String,
    pub first_response_time_minutes: i32,
    pub resolution_time_minutes: i32,
    pub business_hours_only: bool,
    pub is_active: bool,
}

impl SlaPolicy {
    /// Minutes rendered as `45m`, `4h` or `1d 2h`.
    #[must_use]
    pub fn format_minutes(minutes: i32) -> String {
        let minutes = minutes.max(0);
        let (days, rem) = (minutes / 1440, minutes % 1440);
        let (hours, mins) = (rem / 60, rem % 60);
        match (days, hours, mins) {
            (0, 0, m) => format!("{m}m"),
            (0, h, 0) => format!("{h}h"),
            (0, h, m) => format!("{h}h {m}m"),
            (d, 0, 0) => format!("{d}d"),
            (d, h, _) => format!("{d}d {h}h"),
        }
    }

    #[must_use]
    pub fn first_response_display(&self) -> String {
        Self::format_minutes(self.first_response_time_minutes)
    }

    #[must_use]
    pub fn resolution_display(&self) -> String {
        Self::format_minutes(self.resolution_time_minutes)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailTemplate {
    pub id: EmailTemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub template_type: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(SlaPolicy::format_minutes(45), "45m");
        assert_eq!(SlaPolicy::format_minutes(240), "4h");
        assert_eq!(SlaPolicy::format_minutes(90), "1h 30m");
        assert_eq!(SlaPolicy::format_minutes(1440), "1d");
        assert_eq!(SlaPolicy::format_minutes(1560), "1d 2h");
    }
}

//! Aggregation helpers for the calls, reports and analytics pages.
//!
//! The database views already do the heavy lifting; these functions only
//! fold the rows a page fetched into the figures it displays.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UnknownVariant;

/// New value of an automation rule's active flag after a toggle.
///
/// A missing flag counts as inactive, so toggling it activates the rule.
#[must_use]
pub const fn toggled(is_active: Option<bool>) -> bool {
    !matches!(is_active, Some(true))
}

/// Format a duration in seconds as `m:ss`. Negative input reads as zero.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Integer percentage of `part` in `whole`, for bar widths. Zero when `whole` is zero.
#[must_use]
pub fn percent_of(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part.max(0) * 100) / whole
}

/// One call row as the stats need it.
#[derive(Debug, Clone, Copy)]
pub struct CallSample<'a> {
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i32,
    pub call_status: &'a str,
}

/// Headline figures on the calls page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallStats {
    /// Calls started on `today` (UTC).
    pub today: usize,
    /// Mean duration over all sampled calls, truncated to whole seconds.
    pub average_seconds: i64,
    pub missed: usize,
}

impl CallStats {
    #[must_use]
    pub fn compute<'a>(calls: impl IntoIterator<Item = CallSample<'a>>, today: NaiveDate) -> Self {
        let mut stats = Self::default();
        let mut total_seconds = 0_i64;
        let mut count = 0_i64;
        for call in calls {
            count += 1;
            total_seconds += i64::from(call.duration_seconds);
            if call.started_at.date_naive() == today {
                stats.today += 1;
            }
            if call.call_status == "missed" {
                stats.missed += 1;
            }
        }
        stats.average_seconds = if count == 0 { 0 } else { total_seconds / count };
        stats
    }

    /// Average duration as `m:ss`.
    #[must_use]
    pub fn average_display(&self) -> String {
        format_duration(self.average_seconds)
    }
}

/// Time window selectable on the reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportRange {
    #[default]
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "90days")]
    NinetyDays,
}

impl ReportRange {
    pub const ALL: [Self; 3] = [Self::SevenDays, Self::ThirtyDays, Self::NinetyDays];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7days",
            Self::ThirtyDays => "30days",
            Self::NinetyDays => "90days",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SevenDays => "Last 7 days",
            Self::ThirtyDays => "Last 30 days",
            Self::NinetyDays => "Last 90 days",
        }
    }

    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
            Self::NinetyDays => 90,
        }
    }

    /// First day included in the window ending on `today`.
    #[must_use]
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days() - 1)
    }
}

impl std::str::FromStr for ReportRange {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("report range", s))
    }
}

/// One row of the `ticket_metrics` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub total_tickets: i64,
    pub resolved_tickets: i64,
    pub avg_resolution_time_hours: Option<f64>,
    pub sla_breached_tickets: i64,
}

/// Totals over the displayed metric rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportTotals {
    pub total: i64,
    pub resolved: i64,
    /// Mean of the per-day averages; days with no figure count as zero.
    pub avg_resolution_hours: f64,
    pub sla_breached: i64,
}

impl ReportTotals {
    #[must_use]
    pub fn compute(metrics: &[DailyMetric]) -> Self {
        let total = metrics.iter().map(|m| m.total_tickets).sum();
        let resolved = metrics.iter().map(|m| m.resolved_tickets).sum();
        let sla_breached = metrics.iter().map(|m| m.sla_breached_tickets).sum();
        let avg_resolution_hours = if metrics.is_empty() {
            0.0
        } else {
            let sum: f64 = metrics
                .iter()
                .map(|m| m.avg_resolution_time_hours.unwrap_or(0.0))
                .sum();
            #[allow(clippy::cast_precision_loss)] // at most a few hundred rows
            let len = metrics.len() as f64;
            sum / len
        };
        Self {
            total,
            resolved,
            avg_resolution_hours,
            sla_breached,
        }
    }

    /// Average resolution time to one decimal place.
    #[must_use]
    pub fn avg_resolution_display(&self) -> String {
        format!("{:.1}", self.avg_resolution_hours)
    }

    /// Resolved share of all tickets, as a one-decimal percentage.
    #[must_use]
    pub fn resolution_rate_display(&self) -> String {
        rate_display(self.resolved, self.total)
    }

    /// SLA-breached share of all tickets, as a one-decimal percentage.
    #[must_use]
    pub fn breach_rate_display(&self) -> String {
        rate_display(self.sla_breached, self.total)
    }
}

fn rate_display(part: i64, whole: i64) -> String {
    if whole <= 0 {
        return "0".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = part as f64 / whole as f64 * 100.0;
    format!("{rate:.1}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_double_toggle_returns_to_original() {
        for start in [true, false] {
            assert_eq!(toggled(Some(toggled(Some(start)))), start);
        }
        assert!(toggled(None));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(61), "1:01");
        assert_eq!(format_duration(3600), "60:00");
        assert_eq!(format_duration(-5), "0:00");
    }

    #[test]
    fn test_call_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let at = |d: u32| Utc.with_ymd_and_hms(2025, 3, d, 10, 0, 0).unwrap();
        let calls = [
            CallSample {
                started_at: at(14),
                duration_seconds: 125,
                call_status: "completed",
            },
            CallSample {
                started_at: at(14),
                duration_seconds: 0,
                call_status: "missed",
            },
            CallSample {
                started_at: at(13),
                duration_seconds: 200,
                call_status: "completed",
            },
        ];
        let stats = CallStats::compute(calls, today);
        assert_eq!(stats.today, 2);
        assert_eq!(stats.missed, 1);
        assert_eq!(stats.average_seconds, 108);
        assert_eq!(stats.average_display(), "1:48");
    }

    #[test]
    fn test_call_stats_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let stats = CallStats::compute(std::iter::empty(), today);
        assert_eq!(stats, CallStats::default());
        assert_eq!(stats.average_display(), "0:00");
    }

    #[test]
    fn test_report_range() {
        assert_eq!("30days".parse::<ReportRange>().unwrap(), ReportRange::ThirtyDays);
        assert!("1year".parse::<ReportRange>().is_err());
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(
            ReportRange::SevenDays.start(today),
            NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
        );
    }

    fn metric(day: u32, total: i64, resolved: i64, hours: Option<f64>, breached: i64) -> DailyMetric {
        DailyMetric {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            total_tickets: total,
            resolved_tickets: resolved,
            avg_resolution_time_hours: hours,
            sla_breached_tickets: breached,
        }
    }

    #[test]
    fn test_report_totals() {
        let rows = [
            metric(14, 10, 6, Some(3.0), 1),
            metric(13, 5, 4, None, 0),
            metric(12, 5, 2, Some(4.5), 2),
        ];
        let totals = ReportTotals::compute(&rows);
        assert_eq!(totals.total, 20);
        assert_eq!(totals.resolved, 12);
        assert_eq!(totals.sla_breached, 3);
        assert_eq!(totals.avg_resolution_display(), "2.5");
        assert_eq!(totals.resolution_rate_display(), "60.0");
        assert_eq!(totals.breach_rate_display(), "15.0");
    }

    #[test]
    fn test_report_totals_empty() {
        let totals = ReportTotals::compute(&[]);
        assert_eq!(totals.avg_resolution_display(), "0.0");
        assert_eq!(totals.resolution_rate_display(), "0");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), 25);
        assert_eq!(percent_of(3, 0), 0);
    }
}

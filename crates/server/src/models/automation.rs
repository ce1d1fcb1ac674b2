//! Automation rules.
//!
//! Rules are configuration rows only. They can be listed and switched on or
//! off; nothing in the application evaluates them.

use chrono::{DateTime, Utc};

use helpdesk_core::AutomationRuleId;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AutomationRule {
    pub id: AutomationRuleId,
    pub name: String,
    pub description: Option<String>,
    pub trigger_event: String,
    pub conditions: Option<serde_json::Value>,
    pub actions: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl AutomationRule {
    #[must_use]
    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }

    /// Number of configured actions, for the list view.
    #[must_use]
    pub fn action_count(&self) -> usize {
        match &self.actions {
            Some(serde_json::Value::Array(items)) => items.len(),
            Some(serde_json::Value::Object(map)) => map.len(),
            Some(serde_json::Value::Null) | None => 0,
            Some(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(actions: Option<serde_json::Value>) -> AutomationRule {
        AutomationRule {
            id: AutomationRuleId::new(uuid::Uuid::new_v4()),
            name: "Escalate urgent".to_string(),
            description: None,
            trigger_event: "ticket_created".to_string(),
            conditions: None,
            actions,
            is_active: None,
            priority: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_flag_is_inactive() {
        assert!(!rule(None).active());
    }

    #[test]
    fn test_action_count() {
        assert_eq!(rule(None).action_count(), 0);
        assert_eq!(
            rule(Some(serde_json::json!([{"type": "assign"}, {"type": "notify"}]))).action_count(),
            2
        );
        assert_eq!(rule(Some(serde_json::json!({"set_priority": "urgent"}))).action_count(), 1);
    }
}

//! Demo reference data.
//!
//! Each table is seeded only while it is empty, so running the command twice
//! leaves the second run a no-op.

use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use helpdesk_core::TicketPriority;

use super::CommandError;

const DEPARTMENTS: &[(&str, &str, &str)] = &[
    ("Support", "support@example.com", "First-line customer support"),
    ("Billing", "billing@example.com", "Invoices, refunds and plan changes"),
    ("Technical", "tech@example.com", "Escalated technical issues"),
];

/// Priority, first response minutes, resolution minutes.
const SLA_POLICIES: &[(TicketPriority, i32, i32)] = &[
    (TicketPriority::Urgent, 15, 240),
    (TicketPriority::High, 60, 480),
    (TicketPriority::Medium, 240, 1440),
    (TicketPriority::Low, 480, 2880),
];

const KB_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Getting Started", "Setting up your account", "rocket"),
    ("Account & Billing", "Plans, payments and invoices", "credit-card"),
    ("Troubleshooting", "Fixes for common problems", "wrench"),
];

const EMAIL_TEMPLATES: &[(&str, &str, &str, &str)] = &[
    (
        "Ticket received",
        "We received your request",
        "Thanks for contacting us. Your ticket number is {{ticket_number}}.",
        "ticket_created",
    ),
    (
        "Ticket resolved",
        "Your request has been resolved",
        "Ticket {{ticket_number}} has been resolved. Reply to reopen it.",
        "ticket_resolved",
    ),
];

/// Rows inserted per table.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub departments: usize,
    pub sla_policies: usize,
    pub kb_categories: usize,
    pub automation_rules: usize,
    pub email_templates: usize,
}

async fn is_empty(tx: &mut Transaction<'_, Postgres>, table: &str) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT NOT EXISTS (SELECT 1 FROM {table})");
    sqlx::query_scalar::<_, bool>(&query).fetch_one(&mut **tx).await
}

/// Seed every reference table that has no rows yet.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is written in that case.
pub async fn run(pool: &PgPool) -> Result<SeedSummary, CommandError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    if is_empty(&mut tx, "departments").await? {
        for (name, email, description) in DEPARTMENTS {
            sqlx::query("INSERT INTO departments (name, email, description) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(email)
                .bind(description)
                .execute(&mut *tx)
                .await?;
        }
        summary.departments = DEPARTMENTS.len();
    }

    if is_empty(&mut tx, "sla_policies").await? {
        for (priority, first_response, resolution) in SLA_POLICIES {
            sqlx::query(
                r"
                INSERT INTO sla_policies
                    (name, priority, first_response_time_minutes, resolution_time_minutes)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(format!("{} priority", priority.label()))
            .bind(priority.as_str())
            .bind(first_response)
            .bind(resolution)
            .execute(&mut *tx)
            .await?;
        }
        summary.sla_policies = SLA_POLICIES.len();
    }

    if is_empty(&mut tx, "kb_categories").await? {
        for (order, (name, description, icon)) in (0_i32..).zip(KB_CATEGORIES) {
            sqlx::query(
                r"
                INSERT INTO kb_categories (name, description, icon, display_order)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(name)
            .bind(description)
            .bind(icon)
            .bind(order)
            .execute(&mut *tx)
            .await?;
        }
        summary.kb_categories = KB_CATEGORIES.len();
    }

    if is_empty(&mut tx, "automation_rules").await? {
        let rules = [
            (
                "Escalate urgent tickets",
                "Notify the team lead when an urgent ticket arrives",
                "ticket_created",
                json!([{ "type": "notify", "target": "team_lead" }]),
                10,
                true,
            ),
            (
                "Flag SLA breaches",
                "Raise priority and notify the assignee",
                "sla_breached",
                json!([
                    { "type": "set_priority", "value": "urgent" },
                    { "type": "notify", "target": "assignee" }
                ]),
                5,
                true,
            ),
            (
                "Reopen on customer reply",
                "Move resolved tickets back to open",
                "customer_replied",
                json!([{ "type": "set_status", "value": "open" }]),
                0,
                false,
            ),
        ];
        for (name, description, trigger, actions, priority, active) in &rules {
            sqlx::query(
                r"
                INSERT INTO automation_rules
                    (name, description, trigger_event, actions, priority, is_active)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(name)
            .bind(description)
            .bind(trigger)
            .bind(actions)
            .bind(priority)
            .bind(active)
            .execute(&mut *tx)
            .await?;
        }
        summary.automation_rules = rules.len();
    }

    if is_empty(&mut tx, "email_templates").await? {
        for (name, subject, body, template_type) in EMAIL_TEMPLATES {
            sqlx::query(
                "INSERT INTO email_templates (name, subject, body, template_type) VALUES ($1, $2, $3, $4)",
            )
            .bind(name)
            .bind(subject)
            .bind(body)
            .bind(template_type)
            .execute(&mut *tx)
            .await?;
        }
        summary.email_templates = EMAIL_TEMPLATES.len();
    }

    tx.commit().await?;

    tracing::info!(
        departments = summary.departments,
        sla_policies = summary.sla_policies,
        kb_categories = summary.kb_categories,
        automation_rules = summary.automation_rules,
        email_templates = summary.email_templates,
        "Seeding complete"
    );
    Ok(summary)
}

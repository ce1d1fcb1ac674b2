//! Automation rule toggling.

use uuid::Uuid;

use helpdesk_integration_tests::{TestContext, assert_redirect};

async fn is_active(ctx: &TestContext, id: Uuid) -> Option<bool> {
    sqlx::query_scalar::<_, Option<bool>>("SELECT is_active FROM automation_rules WHERE id = $1")
        .bind(id)
        .fetch_one(&ctx.pool)
        .await
        .expect("Query failed")
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_toggle_twice_restores_state() {
    let ctx = TestContext::new().await;
    ctx.sign_up(&["super_admin"]).await;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO automation_rules (name, trigger_event, is_active) VALUES ($1, 'ticket_created', true) RETURNING id",
    )
    .bind(format!("Rule {}", Uuid::new_v4().simple()))
    .fetch_one(&ctx.pool)
    .await
    .expect("Insert failed");

    let path = format!("/automations/{id}/toggle");
    assert_redirect(&ctx.post_form(&path, &[]).await, "/automations");
    assert_eq!(is_active(&ctx, id).await, Some(false));

    ctx.post_form(&path, &[]).await;
    assert_eq!(is_active(&ctx, id).await, Some(true));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unset_rule_toggles_to_active() {
    let ctx = TestContext::new().await;
    ctx.sign_up(&["super_admin"]).await;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO automation_rules (name, trigger_event, is_active) VALUES ($1, 'ticket_created', NULL) RETURNING id",
    )
    .bind(format!("Rule {}", Uuid::new_v4().simple()))
    .fetch_one(&ctx.pool)
    .await
    .expect("Insert failed");

    ctx.post_form(&format!("/automations/{id}/toggle"), &[]).await;
    assert_eq!(is_active(&ctx, id).await, Some(true));
}

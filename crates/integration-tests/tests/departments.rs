//! Department management, including confirmed deletion.

use uuid::Uuid;

use helpdesk_integration_tests::{TestContext, assert_redirect};

async fn department_id(ctx: &TestContext, name: &str) -> Option<Uuid> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM departments WHERE name = $1")
        .bind(name)
        .fetch_optional(&ctx.pool)
        .await
        .expect("Query failed")
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_department_lifecycle() {
    let ctx = TestContext::new().await;
    ctx.sign_up(&["super_admin"]).await;
    let name = format!("Dept {}", Uuid::new_v4().simple());

    let response = ctx
        .post_form("/departments", &[("name", &name), ("email", "dept@example.com")])
        .await;
    assert_redirect(&response, "/departments");
    assert!(ctx.page("/departments").await.contains(&name));

    let id = department_id(&ctx, &name).await.expect("Department not created");
    let renamed = format!("{name} renamed");
    ctx.post_form(
        &format!("/departments/{id}"),
        &[("name", &renamed), ("email", "dept@example.com")],
    )
    .await;
    assert_eq!(department_id(&ctx, &renamed).await, Some(id));

    // Unconfirmed delete is a no-op
    ctx.post_form(&format!("/departments/{id}/delete"), &[]).await;
    assert_eq!(department_id(&ctx, &renamed).await, Some(id));

    ctx.post_form(&format!("/departments/{id}/delete"), &[("confirm", "yes")])
        .await;
    assert_eq!(department_id(&ctx, &renamed).await, None);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_invalid_department_is_not_created() {
    let ctx = TestContext::new().await;
    ctx.sign_up(&["super_admin"]).await;
    let name = format!("Dept {}", Uuid::new_v4().simple());

    ctx.post_form("/departments", &[("name", &name), ("email", "not-an-email")])
        .await;
    assert_eq!(department_id(&ctx, &name).await, None);
}

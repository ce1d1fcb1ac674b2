//! Knowledge base search.

use helpdesk_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_search_without_matches_shows_empty_state() {
    let ctx = TestContext::new().await;
    ctx.sign_up(&[]).await;

    let body = ctx.page("/knowledge-base?q=zzqxjv-no-such-article").await;
    assert!(body.contains("No articles found."));
}

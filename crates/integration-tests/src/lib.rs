//! End-to-end tests against a running help desk server.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server against a disposable database
//! cargo run -p helpdesk-server
//!
//! # Run the ignored tests
//! cargo test -p helpdesk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `HELPDESK_TEST_URL` - Server base URL (default: `http://localhost:3000`)
//! - `HELPDESK_DATABASE_URL` - Same database the server uses, for fixtures

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode, header};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every account the tests create.
pub const PASSWORD: &str = "integration-pass";

/// A cookie-carrying client bound to one server, plus a database handle for fixtures.
///
/// Redirects are not followed, so tests can assert on `303` responses.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
}

impl TestContext {
    pub async fn new() -> Self {
        let base_url = std::env::var("HELPDESK_TEST_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let database_url = std::env::var("HELPDESK_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("HELPDESK_DATABASE_URL must be set");

        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        Self {
            client,
            base_url,
            pool,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET a page and return its body, asserting it rendered.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("Failed to read body")
    }

    /// Sign up a fresh account and keep its session. Extra roles are
    /// granted directly in the database on top of the default viewer role.
    pub async fn sign_up(&self, extra_roles: &[&str]) -> String {
        let email = format!("it-{}@example.com", Uuid::new_v4().simple());
        let response = self
            .post_form(
                "/auth/sign-up",
                &[
                    ("email", &email),
                    ("password", PASSWORD),
                    ("full_name", "Integration Tester"),
                ],
            )
            .await;
        assert_redirect(&response, "/");

        for role in extra_roles {
            sqlx::query(
                r"
                INSERT INTO user_roles (user_id, role)
                SELECT id, $2::app_role FROM users WHERE email = $1
                ON CONFLICT (user_id, role) DO NOTHING
                ",
            )
            .bind(&email)
            .bind(role)
            .execute(&self.pool)
            .await
            .expect("Failed to grant role");
        }

        email
    }
}

/// Assert a `303 See Other` to `location`.
pub fn assert_redirect(response: &Response, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some(location)
    );
}

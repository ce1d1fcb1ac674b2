//! Customers list and customer creation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::{CustomerRepository, RepositoryError, non_empty};
use crate::middleware::{RequireAuth, RequireRole, RoleRequirement, Staff};
use crate::models::CustomerWithTickets;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::CustomerForm;
use crate::state::AppState;

use super::layout::{Chrome, format_date};

const LIST_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub ticket_count: i64,
    pub created_at: String,
}

impl From<&CustomerWithTickets> for CustomerView {
    fn from(row: &CustomerWithTickets) -> Self {
        let customer = &row.customer;
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone().unwrap_or_default(),
            company: customer.company.clone().unwrap_or_default(),
            ticket_count: row.ticket_count,
            created_at: format_date(customer.created_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "customers.html")]
pub struct CustomersTemplate {
    pub chrome: Chrome,
    pub customers: Vec<CustomerView>,
    pub search_query: String,
    pub can_create: bool,
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    auth: RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/customers").await;
    let search = non_empty(query.q.as_deref());

    let customers = match CustomerRepository::new(state.pool())
        .list(search.as_deref(), LIST_LIMIT)
        .await
    {
        Ok(customers) => customers.iter().map(CustomerView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load customers");
            chrome.flash(Flash::error("Error loading customers"));
            Vec::new()
        }
    };

    CustomersTemplate {
        chrome,
        customers,
        search_query: search.unwrap_or_default(),
        can_create: auth.auth.has_any_role(Staff::ROLES),
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create(
    auth: RequireRole<Staff>,
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> Redirect {
    let customer = match form.validate() {
        Ok(customer) => customer,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error creating customer").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/customers");
        }
    };

    match CustomerRepository::new(state.pool()).create(&customer).await {
        Ok(created) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "create",
                "customer",
                Some(created.id.to_string()),
                &serde_json::json!({ "name": created.name, "email": created.email }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Customer created")).await;
        }
        Err(RepositoryError::Conflict(_)) => {
            flash::push(
                &auth.session,
                Flash::error("Error creating customer")
                    .with_description("A customer with this email already exists"),
            )
            .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create customer");
            flash::push(&auth.session, Flash::error("Error creating customer")).await;
        }
    }

    Redirect::to("/customers")
}

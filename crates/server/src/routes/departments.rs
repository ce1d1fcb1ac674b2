//! Department management.
//!
//! Anyone signed in can see the list. Creating, editing and deleting
//! departments requires `super_admin`, and a delete only happens after the
//! confirmation page is answered with "yes".

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use helpdesk_core::DepartmentId;

use crate::db::{DepartmentRepository, RepositoryError};
use crate::middleware::{RequireAuth, RequireRole, SuperAdminOnly};
use crate::models::Department;
use crate::services::audit;
use crate::services::flash::{self, Flash};
use crate::services::forms::{ConfirmForm, DepartmentForm};
use crate::state::AppState;

use super::layout::{Chrome, format_date};
use super::not_found;

#[derive(Debug, Clone)]
pub struct DepartmentView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub description: String,
    pub created_at: String,
}

impl From<&Department> for DepartmentView {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id.to_string(),
            name: department.name.clone(),
            email: department.email.clone(),
            description: department.description.clone().unwrap_or_default(),
            created_at: format_date(department.created_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "departments/index.html")]
pub struct DepartmentsTemplate {
    pub chrome: Chrome,
    pub departments: Vec<DepartmentView>,
    pub can_manage: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "departments/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub chrome: Chrome,
    pub department: DepartmentView,
}

fn parse_id(id: &str) -> Option<DepartmentId> {
    id.parse().ok()
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(auth: RequireAuth, State(state): State<AppState>) -> impl IntoResponse {
    let mut chrome = Chrome::new(&auth, "/departments").await;

    let departments = match DepartmentRepository::new(state.pool()).list().await {
        Ok(departments) => departments.iter().map(DepartmentView::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load departments");
            chrome.flash(Flash::error("Error loading departments"));
            Vec::new()
        }
    };

    DepartmentsTemplate {
        chrome,
        departments,
        can_manage: auth.auth.is_super_admin(),
    }
}

#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn create(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Form(form): Form<DepartmentForm>,
) -> Redirect {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error creating department").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/departments");
        }
    };

    match DepartmentRepository::new(state.pool()).create(&input).await {
        Ok(department) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "create",
                "department",
                Some(department.id.to_string()),
                &serde_json::json!({ "name": department.name, "email": department.email }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Department created")).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create department");
            flash::push(&auth.session, Flash::error("Error creating department")).await;
        }
    }

    Redirect::to("/departments")
}

#[instrument(skip_all, fields(user_id = %auth.user.id, department_id = %id))]
pub async fn update(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DepartmentForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found().into_response();
    };

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => {
            flash::push(
                &auth.session,
                Flash::error("Error updating department").with_description(e.to_string()),
            )
            .await;
            return Redirect::to("/departments").into_response();
        }
    };

    match DepartmentRepository::new(state.pool()).update(id, &input).await {
        Ok(department) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "update",
                "department",
                Some(id.to_string()),
                &serde_json::json!({ "name": department.name, "email": department.email }),
            )
            .await;
            flash::push(&auth.session, Flash::success("Department updated")).await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update department");
            flash::push(&auth.session, Flash::error("Error updating department")).await;
        }
    }

    Redirect::to("/departments").into_response()
}

/// Ask before deleting.
#[instrument(skip_all, fields(user_id = %auth.user.id, department_id = %id))]
pub async fn confirm_delete(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found().into_response();
    };

    let department = match DepartmentRepository::new(state.pool()).get(id).await {
        Ok(Some(department)) => department,
        Ok(None) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load department");
            flash::push(&auth.session, Flash::error("Error loading department")).await;
            return Redirect::to("/departments").into_response();
        }
    };

    let auth = auth.into_auth();
    ConfirmDeleteTemplate {
        chrome: Chrome::new(&auth, "/departments").await,
        department: DepartmentView::from(&department),
    }
    .into_response()
}

#[instrument(skip_all, fields(user_id = %auth.user.id, department_id = %id))]
pub async fn delete(
    auth: RequireRole<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return not_found().into_response();
    };

    if !form.is_confirmed() {
        flash::push(&auth.session, Flash::info("Deletion cancelled")).await;
        return Redirect::to("/departments").into_response();
    }

    match DepartmentRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            audit::record(
                state.pool(),
                Some(auth.user.id),
                "delete",
                "department",
                Some(id.to_string()),
                &serde_json::Value::Null,
            )
            .await;
            flash::push(&auth.session, Flash::success("Department deleted")).await;
        }
        Err(RepositoryError::NotFound) => return not_found().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete department");
            flash::push(&auth.session, Flash::error("Error deleting department")).await;
        }
    }

    Redirect::to("/departments").into_response()
}

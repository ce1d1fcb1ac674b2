//! JSON endpoints.

use axum::Json;
use serde::Serialize;

use helpdesk_core::{AppRole, UserId};

use crate::middleware::RequireAuth;

/// The signed-in principal and the roles resolved for this request.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub roles: Vec<AppRole>,
    pub primary_role: AppRole,
}

/// `GET /api/me`. Anonymous callers get `401` from the gate.
pub async fn me(auth: RequireAuth) -> Json<MeResponse> {
    let roles = auth
        .auth
        .roles
        .roles()
        .map(|set| set.iter().collect())
        .unwrap_or_default();

    Json(MeResponse {
        id: auth.user.id,
        email: auth.user.email.to_string(),
        full_name: auth.user.full_name.clone(),
        roles,
        primary_role: auth.auth.primary_role(),
    })
}

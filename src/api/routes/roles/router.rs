//! Router for the roles API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::Error;

type SharedState = Arc<RwLock<AppState>>;

/// Reject roles whose model the API doesn't serve before they are saved
async fn validate_model(state: &SharedState, model: &str) -> Result<(), Error> {
    let orchestrator = state
        .read()
        .expect("Unable to read share state")
        .orchestrator
        .clone();
    orchestrator
        .client()
        .check_model(model)
        .await
        .map_err(|e| match e {
            Error::Configuration(msg) => Error::InvalidRequest(msg),
            e => e,
        })
}

/// List every role in the catalog
async fn list_roles(State(state): State<SharedState>) -> Json<public::RolesResponse> {
    let roles = state
        .read()
        .expect("Unable to read share state")
        .catalog
        .list();
    Json(public::RolesResponse { roles })
}

/// Add a new role
async fn add_role(
    State(state): State<SharedState>,
    Json(payload): Json<public::RoleRequest>,
) -> Result<Json<public::RoleMutationResponse>, ApiError> {
    validate_model(&state, &payload.role.model_id).await?;

    let role = state
        .write()
        .expect("Unable to write share state")
        .catalog
        .add(payload.role)?;
    tracing::info!("Added role {} ({})", role.name, role.key);

    Ok(Json(public::RoleMutationResponse::ok(role)))
}

/// Update an existing role, renaming it if the display name changed
async fn update_role(
    State(state): State<SharedState>,
    Json(payload): Json<public::RoleRequest>,
) -> Result<Json<public::RoleMutationResponse>, ApiError> {
    validate_model(&state, &payload.role.model_id).await?;

    let role = state
        .write()
        .expect("Unable to write share state")
        .catalog
        .update(payload.role, payload.original_name.as_deref())?;
    tracing::info!("Updated role {} ({})", role.name, role.key);

    Ok(Json(public::RoleMutationResponse::ok(role)))
}

/// Delete a role by key or display name, given either as the
/// `role_name` query param or a JSON `{"name": ...}` body
async fn delete_role(
    State(state): State<SharedState>,
    Query(params): Query<public::DeleteRoleQuery>,
    body: Option<Json<public::DeleteRoleBody>>,
) -> Result<Json<public::RoleMutationResponse>, ApiError> {
    let role_name = params
        .role_name
        .or(body.map(|Json(body)| body.name))
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::InvalidRequest("role_name is required".to_string()))?;

    let role = state
        .write()
        .expect("Unable to write share state")
        .catalog
        .delete(&role_name)?;
    tracing::info!("Deleted role {} ({})", role.name, role.key);

    Ok(Json(public::RoleMutationResponse::ok(role)))
}

/// Create the roles router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_roles))
        .route("/add", post(add_role))
        .route("/update", post(update_role))
        .route("/delete", post(delete_role))
}

//! API routes module

pub mod conversation;
pub mod roles;

use std::sync::{Arc, RwLock};

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Role catalog routes
        .nest("/roles", roles::router())
        // Conversation and single role testing
        .merge(conversation::router())
        .route("/health", get(health))
}

//! Router for running conversations and testing single roles

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};

use super::public;
use crate::api::public::{ApiError, status_for};
use crate::api::state::AppState;
use crate::conversation::{
    ActiveRoleSet, ConversationConfig, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MAX_TURNS, Transcript,
};
use crate::core::Error;

type SharedState = Arc<RwLock<AppState>>;

/// Run a conversation between the requested roles and return the
/// updated transcript
async fn start_conversation(
    State(state): State<SharedState>,
    Json(payload): Json<public::ConversationRequest>,
) -> Result<Response, ApiError> {
    let (orchestrator, active_roles) = {
        let shared_state = state.read().expect("Unable to read share state");
        let roles = payload
            .active_roles
            .iter()
            .map(|name| {
                shared_state
                    .catalog
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::RoleNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        (shared_state.orchestrator.clone(), ActiveRoleSet::new(roles))
    };

    let config = ConversationConfig::new(&payload.topic, active_roles)
        .with_max_turns(payload.max_turns.unwrap_or(DEFAULT_MAX_TURNS))
        .with_max_output_tokens(payload.max_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS))
        .with_transcript(Transcript::new_with_messages(payload.conversation_history))
        .with_next_speaker(payload.next_speaker.as_deref())
        .with_user_input(payload.user_input.as_deref());

    tracing::debug!(
        "Starting conversation on {:?} with {} roles",
        config.topic,
        config.active_roles.len()
    );

    match orchestrator.run(config).await {
        Ok(transcript) => Ok(Json(public::ConversationResponse {
            messages: transcript.into_messages(),
        })
        .into_response()),
        Err(partial) => {
            let status = status_for(&partial.error);
            if status.is_server_error() {
                tracing::error!(
                    "Conversation failed after {} messages: {}",
                    partial.transcript.len(),
                    partial.error
                );
            }
            Ok((
                status,
                Json(public::ConversationFailure {
                    detail: partial.error.to_string(),
                    messages: partial.transcript.into_messages(),
                }),
            )
                .into_response())
        }
    }
}

/// Ask a single role one question
async fn test_role(
    State(state): State<SharedState>,
    Json(payload): Json<public::TestRoleRequest>,
) -> Result<Json<public::TestRoleResponse>, ApiError> {
    let (orchestrator, role) = {
        let shared_state = state.read().expect("Unable to read share state");
        let role = shared_state
            .catalog
            .get(&payload.role_name)
            .cloned()
            .ok_or_else(|| Error::RoleNotFound(payload.role_name.clone()))?;
        (shared_state.orchestrator.clone(), role)
    };

    let content = orchestrator
        .test_role(&role, &payload.question, payload.max_tokens)
        .await?;

    Ok(Json(public::TestRoleResponse {
        message: public::RoleReply {
            role: role.name,
            content,
        },
    }))
}

/// Create the conversation router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/conversation", post(start_conversation))
        .route("/test-role", post(test_role))
}

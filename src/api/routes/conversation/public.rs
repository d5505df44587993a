//! Public types for the conversation API
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

#[derive(Deserialize)]
pub struct ConversationRequest {
    pub topic: String,
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Role keys or display names in speaking order
    #[serde(alias = "roles")]
    pub active_roles: Vec<String>,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default)]
    pub next_speaker: Option<String>,
    #[serde(default)]
    pub user_input: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}

/// Returned when the model fails part way through a conversation.
/// `messages` holds everything generated before the failure.
#[derive(Serialize, Deserialize)]
pub struct ConversationFailure {
    pub detail: String,
    pub messages: Vec<Message>,
}

#[derive(Deserialize)]
pub struct TestRoleRequest {
    #[serde(alias = "role")]
    pub role_name: String,
    pub question: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize)]
pub struct RoleReply {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Deserialize)]
pub struct TestRoleResponse {
    pub message: RoleReply,
}

//! The core models for a multi-role conversation.

use serde::{Deserialize, Serialize};

use crate::roles::{RoleDefinition, normalize_key};

/// Who authored a message from the model's point of view.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Display name of the role that produced a model message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: MessageRole::User,
            content: content.to_string(),
            speaker: None,
        }
    }

    pub fn model(content: &str, speaker: Option<&str>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.to_string(),
            speaker: speaker.map(str::to_string),
        }
    }
}

/// Append-only, ordered conversation history. There is intentionally no
/// way to mutate or remove a message once it has been pushed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    /// The most recent `n` messages.
    pub fn tail(&self, n: usize) -> &[Message] {
        &self.0[self.0.len().saturating_sub(n)..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

/// The roles taking part in one conversation. Iteration order is the
/// speaking order; keys are unique.
#[derive(Clone, Debug, Default)]
pub struct ActiveRoleSet(Vec<RoleDefinition>);

impl ActiveRoleSet {
    /// Later duplicates of a key are dropped.
    pub fn new(roles: Vec<RoleDefinition>) -> Self {
        let mut set: Vec<RoleDefinition> = Vec::with_capacity(roles.len());
        for role in roles {
            if !set.iter().any(|r| r.key == role.key) {
                set.push(role);
            }
        }
        Self(set)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoleDefinition> {
        self.0.iter()
    }

    /// Find a role by key, then display name, then normalized name.
    pub fn resolve(&self, key_or_name: &str) -> Option<&RoleDefinition> {
        let normalized = normalize_key(key_or_name);
        self.0
            .iter()
            .find(|r| r.key == key_or_name)
            .or_else(|| self.0.iter().find(|r| r.name == key_or_name))
            .or_else(|| self.0.iter().find(|r| normalize_key(&r.name) == normalized))
            .or_else(|| self.0.iter().find(|r| r.key == normalized))
    }
}

pub const DEFAULT_MAX_TURNS: u32 = 2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;

#[derive(Clone, Debug)]
pub struct ConversationConfig {
    pub topic: String,
    pub max_turns: u32,
    pub max_output_tokens: u32,
    pub active_roles: ActiveRoleSet,
    pub transcript: Transcript,
    pub next_speaker: Option<String>,
    pub user_input: Option<String>,
}

impl ConversationConfig {
    pub fn new(topic: &str, active_roles: ActiveRoleSet) -> Self {
        Self {
            topic: topic.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            active_roles,
            transcript: Transcript::new(),
            next_speaker: None,
            user_input: None,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_next_speaker(mut self, next_speaker: Option<&str>) -> Self {
        self.next_speaker = next_speaker
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_user_input(mut self, user_input: Option<&str>) -> Self {
        self.user_input = user_input
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }
}

//! Drives a multi-role conversation on top of the model client.
//!
//! Responses are generated strictly one after another since every
//! prompt depends on what was said before it. A run operates in one of
//! three modes:
//!
//! - single speaker: only `next_speaker` answers, once
//! - reactive: the transcript ends in a user message, so every active
//!   role answers that message once
//! - round robin: `max_turns` rounds in which every active role speaks,
//!   each one responding to whatever the previous speaker said

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use super::models::{ConversationConfig, Message, MessageRole, Transcript};
use crate::core::{Error, Result};
use crate::gemini::{GenerationParams, ModelClient};
use crate::prompt::{self, Prompt};
use crate::roles::RoleDefinition;

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    /// Pause between two consecutive role responses
    pub pacing: Duration,
    /// Number of trailing messages sent as context in round robin and
    /// single speaker mode
    pub context_window: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::from_secs(1),
            context_window: 2,
        }
    }
}

/// A run that stopped early. Carries everything appended before the
/// failure along with the error that stopped it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PartialConversation {
    pub transcript: Transcript,
    #[source]
    pub error: Error,
}

impl PartialConversation {
    fn new(transcript: Transcript, error: Error) -> Self {
        Self { transcript, error }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<ModelClient>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(client: Arc<ModelClient>, settings: OrchestratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &ModelClient {
        &self.client
    }

    pub async fn run(
        &self,
        config: ConversationConfig,
    ) -> std::result::Result<Transcript, PartialConversation> {
        if let Err(e) = self.validate(&config) {
            return Err(PartialConversation::new(config.transcript, e));
        }

        match config.next_speaker.clone() {
            Some(speaker) => self.single_speaker(config, &speaker).await,
            None => self.full_round(config).await,
        }
    }

    fn validate(&self, config: &ConversationConfig) -> Result<()> {
        if config.active_roles.is_empty() {
            return Err(Error::InvalidRequest(
                "At least one active role is required".to_string(),
            ));
        }
        if config.max_output_tokens == 0 {
            return Err(Error::InvalidRequest(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    async fn single_speaker(
        &self,
        config: ConversationConfig,
        speaker: &str,
    ) -> std::result::Result<Transcript, PartialConversation> {
        let ConversationConfig {
            topic,
            max_output_tokens,
            active_roles,
            mut transcript,
            user_input,
            ..
        } = config;

        let Some(role) = active_roles.resolve(speaker).cloned() else {
            return Err(PartialConversation::new(
                transcript,
                Error::SpeakerNotFound(speaker.to_string()),
            ));
        };
        if let Err(e) = self.client.check_model(&role.model_id).await {
            return Err(PartialConversation::new(transcript, e));
        }

        let topic = match user_input {
            Some(input) => {
                transcript.push(Message::user(&input));
                input
            }
            None => topic,
        };

        tracing::debug!("Single speaker turn for {}", role.name);
        let context = transcript.tail(self.settings.context_window).to_vec();
        match self
            .turn(&role, &context, &topic, max_output_tokens)
            .await
        {
            Ok(reply) => {
                transcript.push(Message::model(&reply, Some(&role.name)));
                Ok(transcript)
            }
            Err(e) => Err(PartialConversation::new(transcript, e)),
        }
    }

    async fn full_round(
        &self,
        config: ConversationConfig,
    ) -> std::result::Result<Transcript, PartialConversation> {
        let ConversationConfig {
            topic,
            max_turns,
            max_output_tokens,
            active_roles,
            mut transcript,
            user_input,
            ..
        } = config;

        for role in active_roles.iter() {
            if let Err(e) = self.client.check_model(&role.model_id).await {
                return Err(PartialConversation::new(transcript, e));
            }
        }

        if transcript.is_empty() {
            match prompt::render(
                Prompt::ConversationOpening,
                &json!({"topic": topic, "max_tokens": max_output_tokens}),
            ) {
                Ok(opening) => transcript.push(Message::user(&opening)),
                Err(e) => return Err(PartialConversation::new(transcript, e)),
            }
        }

        let mut current_topic = topic;
        if let Some(input) = user_input {
            transcript.push(Message::user(&input));
            current_topic = input;
        }

        let reactive = transcript.len() > 1
            && transcript
                .last()
                .is_some_and(|m| m.role == MessageRole::User);
        let roles: Vec<RoleDefinition> = active_roles.iter().cloned().collect();

        if reactive {
            self.reactive(transcript, &roles, max_output_tokens).await
        } else {
            self.round_robin(transcript, &roles, current_topic, max_turns, max_output_tokens)
                .await
        }
    }

    /// Every role answers the last user message once. The user message
    /// itself is the prompt; everything before it is context.
    async fn reactive(
        &self,
        mut transcript: Transcript,
        roles: &[RoleDefinition],
        max_output_tokens: u32,
    ) -> std::result::Result<Transcript, PartialConversation> {
        let context = transcript.messages()[..transcript.len() - 1].to_vec();
        let message = transcript
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        tracing::debug!("Reactive pass over {} roles", roles.len());

        for (i, role) in roles.iter().enumerate() {
            if i > 0 {
                self.pace().await;
            }
            match self
                .reply(role, &context, &message, max_output_tokens)
                .await
            {
                Ok(reply) => transcript.push(Message::model(&reply, Some(&role.name))),
                Err(e) => return Err(PartialConversation::new(transcript, e)),
            }
        }
        Ok(transcript)
    }

    /// `max_turns` rounds over all roles. Each prompt targets the
    /// previous speaker's reply, starting from the topic.
    async fn round_robin(
        &self,
        mut transcript: Transcript,
        roles: &[RoleDefinition],
        topic: String,
        max_turns: u32,
        max_output_tokens: u32,
    ) -> std::result::Result<Transcript, PartialConversation> {
        let mut current_topic = topic;
        let mut spoken = 0;

        for turn in 0..max_turns {
            tracing::debug!("Round robin turn {}/{}", turn + 1, max_turns);
            for role in roles {
                if spoken > 0 {
                    self.pace().await;
                }
                let context = transcript.tail(self.settings.context_window).to_vec();
                match self
                    .turn(role, &context, &current_topic, max_output_tokens)
                    .await
                {
                    Ok(reply) => {
                        transcript.push(Message::model(&reply, Some(&role.name)));
                        current_topic = reply;
                    }
                    Err(e) => return Err(PartialConversation::new(transcript, e)),
                }
                spoken += 1;
            }
        }
        Ok(transcript)
    }

    async fn turn(
        &self,
        role: &RoleDefinition,
        context: &[Message],
        topic: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let prompt = prompt::render(
            Prompt::RoleTurn,
            &json!({
                "system_prompt": role.system_prompt(),
                "name": role.name,
                "topic": topic,
                "max_tokens": max_output_tokens,
            }),
        )?;
        let params = GenerationParams::for_role(role, max_output_tokens);
        self.client.complete(&params, context, &prompt).await
    }

    async fn reply(
        &self,
        role: &RoleDefinition,
        context: &[Message],
        message: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let prompt = prompt::render(
            Prompt::RoleReply,
            &json!({
                "system_prompt": role.system_prompt(),
                "name": role.name,
                "message": message,
                "max_tokens": max_output_tokens,
            }),
        )?;
        let params = GenerationParams::for_role(role, max_output_tokens);
        self.client.complete(&params, context, &prompt).await
    }

    /// Ask a single role one question outside of any conversation. The
    /// role's description is sent as context.
    pub async fn test_role(
        &self,
        role: &RoleDefinition,
        question: &str,
        max_output_tokens: Option<u32>,
    ) -> Result<String> {
        self.client.check_model(&role.model_id).await?;
        let introduction = prompt::render(
            Prompt::RoleIntroduction,
            &json!({"name": role.name, "description": role.description}),
        )?;
        let max_output_tokens = max_output_tokens
            .filter(|n| *n > 0)
            .unwrap_or(role.max_output_tokens);
        let params = GenerationParams::for_role(role, max_output_tokens);
        self.client
            .complete(&params, &[Message::user(&introduction)], question)
            .await
    }

    async fn pace(&self) {
        if !self.settings.pacing.is_zero() {
            tokio::time::sleep(self.settings.pacing).await;
        }
    }
}

//! Reusable prompts using Handlebars for templating. Strict mode is on
//! so a missing field is a rendering error instead of an empty string.
//! Escaping is turned off since the output is sent to a model, not a
//! browser.

use std::fmt;
use std::sync::LazyLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::core::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    TokenBudget,
    ConversationOpening,
    RoleTurn,
    RoleReply,
    RoleIntroduction,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const TOKEN_BUDGET_PROMPT: &str = "{{prompt}}

IMPORTANT: Please provide a comprehensive response within {{max_tokens}} tokens. Your response should:
1. Cover all important aspects of the topic
2. Stay concise and focused
3. Prioritize quality and relevance
4. Maintain clarity while being brief";

const CONVERSATION_OPENING_PROMPT: &str = "Let's discuss the following topic: {{topic}}

Each response should be comprehensive yet concise, staying within {{max_tokens}} tokens. Focus on quality and relevance while maintaining brevity.";

const ROLE_TURN_PROMPT: &str = "{{#if system_prompt}}{{system_prompt}}

{{/if}}As the {{name}}, please provide your perspective on the topic: {{topic}}, considering the previous discussion. Your response should be comprehensive yet concise, staying within {{max_tokens}} tokens.";

const ROLE_REPLY_PROMPT: &str = "{{#if system_prompt}}{{system_prompt}}

{{/if}}As the {{name}}, please respond to the following message, considering the previous discussion. Your response should be comprehensive yet concise, staying within {{max_tokens}} tokens.

{{message}}";

const ROLE_INTRODUCTION_PROMPT: &str = "You are acting as a {{name}}. {{description}}";

static TEMPLATES: LazyLock<Handlebars<'static>> = LazyLock::new(templates);

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    for (prompt, template) in [
        (Prompt::TokenBudget, TOKEN_BUDGET_PROMPT),
        (Prompt::ConversationOpening, CONVERSATION_OPENING_PROMPT),
        (Prompt::RoleTurn, ROLE_TURN_PROMPT),
        (Prompt::RoleReply, ROLE_REPLY_PROMPT),
        (Prompt::RoleIntroduction, ROLE_INTRODUCTION_PROMPT),
    ] {
        registry
            .register_template_string(&prompt.to_string(), template)
            .expect("Failed to register template");
    }
    registry
}

pub fn render<T: Serialize>(prompt: Prompt, data: &T) -> Result<String> {
    TEMPLATES
        .render(&prompt.to_string(), data)
        .map_err(|e| Error::GenerationFailed(format!("Rendering prompt {} failed: {}", prompt, e)))
}

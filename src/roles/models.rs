use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "models/gemini-2.0-flash-lite";

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

/// Derive a catalog key from a display name.
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// A persona that takes part in conversations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoleDefinition {
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "model")]
    pub model_id: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(rename = "max_tokens", default = "default_max_tokens")]
    pub max_output_tokens: u32,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl RoleDefinition {
    pub fn new(key: &str, name: &str, description: &str, system_prompt: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            model_id: DEFAULT_MODEL.to_string(),
            temperature: default_temperature(),
            max_output_tokens: default_max_tokens(),
            system_prompt: Some(system_prompt.to_string()),
        }
    }

    pub fn with_model(mut self, model_id: &str) -> Self {
        self.model_id = model_id.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fill in a missing key from the display name and drop a blank
    /// system prompt. Web clients send `""` for "no system prompt".
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        if self.key.trim().is_empty() {
            self.key = normalize_key(&self.name);
        }
        if self
            .system_prompt
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            self.system_prompt = None;
        }
        self
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

/// Roles available out of the box before anything has been saved.
pub fn default_roles() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new(
            "business",
            "Business Analyst",
            "Focuses on business value, ROI, and market opportunities",
            "You are a business analyst AI. Your role is to analyze business opportunities, ROI, and market potential. Focus on practical business value and market feasibility. Keep responses concise and to the point.",
        ),
        RoleDefinition::new(
            "customer",
            "Customer Advocate",
            "Represents customer needs and user experience",
            "You are a customer advocate AI. Your role is to represent user needs, preferences, and experience. Focus on usability, accessibility, and customer satisfaction. Keep responses concise and to the point.",
        ),
        RoleDefinition::new(
            "technical",
            "Technical Architect",
            "Handles technical feasibility and implementation details",
            "You are a technical architect AI. Your role is to evaluate technical feasibility, implementation approaches, and system architecture. Focus on technical soundness and implementation details. Keep responses concise and to the point.",
        )
        .with_temperature(0.5),
        RoleDefinition::new(
            "dreamer",
            "Visionary",
            "Brings creative and innovative ideas to the table",
            "You are a visionary AI. Your role is to bring creative and innovative ideas to the table. Think outside the box and propose bold solutions. Keep responses concise and to the point.",
        )
        .with_model("models/gemini-1.5-pro")
        .with_temperature(0.8),
        RoleDefinition::new(
            "critic",
            "Critical Thinker",
            "Challenges assumptions and identifies potential issues",
            "You are a critical thinker AI. Your role is to challenge assumptions and identify potential issues. Be constructive in your criticism. Keep responses concise and to the point.",
        )
        .with_model("models/gemini-1.5-pro")
        .with_temperature(0.6),
        RoleDefinition::new(
            "realizer",
            "Practical Implementer",
            "Focuses on practical implementation and execution",
            "You are a practical implementer AI. Your role is to focus on practical implementation and execution. Break down ideas into actionable steps. Keep responses concise and to the point.",
        )
        .with_model("models/gemini-1.5-pro")
        .with_temperature(0.5),
    ]
}

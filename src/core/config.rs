use std::env;

use super::error::{Error, Result};

pub const DEFAULT_GEMINI_API_HOST: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub roles_path: String,
    pub gemini_api_hostname: String,
    pub gemini_api_key: String,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    /// Build the config from environment variables. A missing API key
    /// is fatal since no model call can succeed without it.
    pub fn from_env() -> Result<Self> {
        let storage_path = storage_path();
        let roles_path = env::var("ROUNDTABLE_ROLES_PATH")
            .unwrap_or_else(|_| format!("{}/config/roles.json", storage_path));
        let gemini_api_hostname = env::var("ROUNDTABLE_GEMINI_API_HOST")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_HOST.to_string());
        let gemini_api_key = env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Configuration("GOOGLE_API_KEY is required".to_string()))?;
        let cors_origin = env::var("ROUNDTABLE_CORS_ORIGIN").ok();

        Ok(Self {
            storage_path,
            roles_path,
            gemini_api_hostname,
            gemini_api_key,
            cors_origin,
        })
    }

    /// Where the role catalog lives when no config could be built
    pub fn default_roles_path() -> String {
        env::var("ROUNDTABLE_ROLES_PATH")
            .unwrap_or_else(|_| format!("{}/config/roles.json", storage_path()))
    }
}

fn storage_path() -> String {
    env::var("ROUNDTABLE_STORAGE_PATH").unwrap_or("./".to_string())
}

//! In-process stand-in for the Gemini API. Used by the unit tests and
//! by the HTTP integration tests to run the server without a network.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::core::{GenerateContentRequest, GenerativeModel};
use crate::core::Result;

/// Replays scripted results in order. Once the script runs out every
/// call answers `reply <n>` where n counts calls from 1.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<(String, GenerateContentRequest)>>,
    models: Vec<String>,
    list_calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            models: vec![
                "models/gemini-2.0-flash-lite".to_string(),
                "models/gemini-1.5-pro".to_string(),
            ],
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> Vec<(String, GenerateContentRequest)> {
        self.requests.lock().expect("Unable to read requests").clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|(_, r)| r.prompt().unwrap_or_default())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> Result<String> {
        let n = {
            let mut requests = self.requests.lock().expect("Unable to read requests");
            requests.push((model.to_string(), request.clone()));
            requests.len()
        };
        match self.script.lock().expect("Unable to read script").pop_front() {
            Some(result) => result,
            None => Ok(format!("reply {}", n)),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.models.clone())
    }
}

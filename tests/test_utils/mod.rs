//! Test utilities for integration tests
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};
use tempfile::TempDir;

use roundtable::api::AppState;
use roundtable::api::app;
use roundtable::conversation::{Orchestrator, OrchestratorSettings};
use roundtable::core::{AppConfig, Result};
use roundtable::gemini::testing::ScriptedModel;
use roundtable::gemini::{ClientSettings, ModelClient};
use roundtable::roles::RoleCatalog;

/// A router wired to a scripted model and a role catalog in a
/// temporary directory. The directory lives as long as this value.
pub struct TestApp {
    pub router: Router,
    pub roles_path: PathBuf,
    pub model: Arc<ScriptedModel>,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    test_app_with_script(Vec::new()).await
}

pub async fn test_app_with_script(script: Vec<Result<String>>) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let roles_path = dir.path().join("config").join("roles.json");
    let catalog = RoleCatalog::open(&roles_path).expect("Failed to open role catalog");

    let settings = ClientSettings {
        min_request_interval: Duration::ZERO,
        max_attempts: 3,
        retry_delay: Duration::ZERO,
    };
    let model = Arc::new(ScriptedModel::new(script));
    let client = ModelClient::new(model.clone(), settings);
    let orchestrator = Orchestrator::new(
        Arc::new(client),
        OrchestratorSettings {
            pacing: Duration::ZERO,
            context_window: 2,
        },
    );

    let app_config = AppConfig {
        storage_path: dir.path().display().to_string(),
        roles_path: roles_path.display().to_string(),
        gemini_api_hostname: String::from("http://localhost:1"),
        gemini_api_key: String::from("test-api-key"),
        cors_origin: None,
    };
    let app_state = AppState::new(catalog, orchestrator, app_config);

    TestApp {
        router: app(Arc::new(RwLock::new(app_state))),
        roles_path,
        model,
        _dir: dir,
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body was not utf-8")
}

use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::conversation::{Orchestrator, OrchestratorSettings};
use crate::core::AppConfig;
use crate::gemini::{ClientSettings, GeminiApi, ModelClient};
use crate::roles::RoleCatalog;

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid CORS origin: {}", e);
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = {
        let state = shared_state.read().expect("Unable to read share state");
        cors_layer(state.config.cors_origin.as_deref())
    };

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = RoleCatalog::open(&config.roles_path)?;
    tracing::debug!(
        "Loaded {} roles from {}",
        catalog.len(),
        config.roles_path
    );

    let api = GeminiApi::new(&config.gemini_api_hostname, &config.gemini_api_key);
    let client = ModelClient::new(Arc::new(api), ClientSettings::default());
    let orchestrator = Orchestrator::new(Arc::new(client), OrchestratorSettings::default());

    let app_state = AppState::new(catalog, orchestrator, config);
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

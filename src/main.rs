//! Gemi - multi-session AI chat
//!
//! Serves a small chat front-end. Each chat keeps its turns in process memory
//! and every new message is sent to the configured model together with the
//! chat's earlier turns.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;

use config::{Config, PromptTemplate};
use crate::core::SessionController;
use providers::{LlmClient, Provider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub provider_name: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemi_chat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("❌ {}", err);
            return Err(err.into());
        }
    };
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let template = match config.persona_file {
        Some(ref path) => {
            let template = PromptTemplate::load_from_file(path).await?;
            tracing::info!("🎭 Loaded persona '{}' from {}", template.persona.name, path.display());
            template
        }
        None => PromptTemplate::default(),
    };

    let client = LlmClient::new(Provider::from_settings(&config.llm)?, template);
    let provider_name = client.provider_name();

    let state = AppState {
        controller: Arc::new(SessionController::new(Arc::new(client))),
        provider_name,
    };

    let app = routes::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("💬 Gemi running at http://{} (powered by {})", addr, provider_name);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

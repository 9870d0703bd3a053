//! claimdesk engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimdesk_engine::config::{AppConfig, ProviderKind};
use claimdesk_engine::infrastructure::{
    gemini::GeminiClient,
    groq::GroqClient,
    ports::LlmPort,
    random::SystemRandom,
    resilient_llm::{ResilientLlmClient, RetryConfig},
};
use claimdesk_engine::{api, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root, falling back to the working directory.
    load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimdesk_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting claimdesk engine");

    // Load configuration; a missing provider key stops startup here.
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    // Create provider client
    let provider: Arc<dyn LlmPort> = match config.provider.kind {
        ProviderKind::Groq => Arc::new(GroqClient::new(
            &config.provider.base_url,
            &config.provider.api_key,
            &config.provider.model,
            config.provider.timeout,
        )),
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            &config.provider.base_url,
            &config.provider.api_key,
            &config.provider.model,
            config.provider.timeout,
        )),
    };
    tracing::info!(
        provider = %config.provider.kind,
        model = %config.provider.model,
        "LLM provider configured"
    );

    let retry_config = RetryConfig::default();
    tracing::info!(
        "LLM client configured with retry: max_attempts={}, base_delay_ms={}",
        retry_config.max_attempts,
        retry_config.base_delay_ms
    );
    let llm = Arc::new(ResilientLlmClient::new(provider, retry_config));

    // Create application
    let app = Arc::new(App::new(
        llm,
        Arc::new(SystemRandom::new()),
        config.generation,
    ));

    let router = api::http::routes()
        .with_state(app)
        .layer(build_cors_layer_from_env())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
    dotenvy::dotenv().ok();
}

/// Browser clients call the API cross-origin. Any origin is allowed unless
/// `CORS_ALLOWED_ORIGINS` lists specific ones.
fn build_cors_layer_from_env() -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "*");

    let Some(allowed_origins) = allowed_origins else {
        return cors.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS had no valid origins, allowing any origin");
        return cors.allow_origin(Any);
    }

    cors.allow_origin(origins)
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatrelay_api::{
    build_router,
    config::{Config, StorageKind},
    state::AppState,
};
use chatrelay_backend::{HttpGenerationClient, HttpResourceLookup};
use chatrelay_persist::{InMemorySessionStore, MongoSessionStore, SessionStore};
use chatrelay_relay::ConversationRelay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting chat relay server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let store = connect_store(&config).await?;

    tracing::info!(url = %config.backend.generation_url, "Initializing generation client");
    let generation = HttpGenerationClient::new((&config.backend).into())?;

    let mut builder = ConversationRelay::builder()
        .store(store)
        .generation(Arc::new(generation))
        .retry_policy((&config.relay).into());

    if config.lookup.enabled {
        tracing::info!(url = %config.lookup.url, "Resource lookup enabled");
        let lookup = HttpResourceLookup::new((&config.lookup).into())?;
        builder = builder.with_lookup(Arc::new(lookup));
    }

    let (relay, listing) = builder.build()?;

    let state = Arc::new(AppState::new(config.clone(), relay, listing));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn SessionStore>> {
    match config.storage.kind {
        StorageKind::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let store = MongoSessionStore::connect(
                &config.mongodb_uri,
                &config.mongodb.database,
                &config.mongodb.collection,
                Duration::from_millis(config.mongodb.timeout_ms),
            )
            .await
            .context("Failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use cardio_core::{
    AssessmentService, AssessmentStore, CoreConfig, FileStore, GatewayClient, IdentityProvider,
    InferenceClient, ProfileRegistry,
};

/// Main entry point for the cardio risk service
///
/// Resolves configuration, loads the profile registry, opens the file store and serves the
/// REST API (with Swagger UI) until the process is stopped.
///
/// # Environment Variables
/// - `CARDIO_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARDIO_DATA_DIR`: Directory for record storage (default: "cardio_data")
/// - `CARDIO_PROFILES_FILE`: YAML profile and token registry (default: "profiles.yaml")
/// - `AI_GATEWAY_URL`, `AI_GATEWAY_API_KEY`, `AI_MODEL`, `AI_TIMEOUT_SECS`, `AI_MAX_RETRIES`:
///   inference gateway settings; only the API key is required
///
/// # Errors
/// Returns an error if configuration is invalid, the profiles file cannot be loaded, the data
/// directory cannot be created, or the server fails to bind or run.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cardio=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_lookup(|name| std::env::var_os(name))?);
    let rest_addr = std::env::var("CARDIO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let registry = ProfileRegistry::load(cfg.profiles_file())?;
    tracing::info!(
        "++ Loaded {} profiles from {}",
        registry.len(),
        cfg.profiles_file().display()
    );
    if registry.is_empty() {
        tracing::warn!("Profile registry is empty; every authenticated request will be rejected");
    }

    let store = FileStore::open(cfg.data_dir())?;
    tracing::info!("++ Storing records under {}", store.root().display());

    let gateway = GatewayClient::new(cfg.gateway().clone())?;
    tracing::info!(model = cfg.gateway().model(), "++ Using inference gateway {}", cfg.gateway().url());

    let identity: Arc<dyn IdentityProvider> = Arc::new(registry);
    let inference: Arc<dyn InferenceClient> = Arc::new(gateway);
    let store: Arc<dyn AssessmentStore> = Arc::new(store);
    let service = Arc::new(AssessmentService::new(identity, inference, store));

    let app = api_rest::router(AppState::new(service));

    tracing::info!("++ Starting cardio REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

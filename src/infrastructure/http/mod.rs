use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::infrastructure::config::Config;
use crate::{
    controllers::{catalog, credentials::CredentialsController, health, tts::TtsController},
    domain::credentials::{CredentialPool, CredentialPools},
    domain::tts::{FailoverPolicy, ProviderId, TtsService, TtsSettings},
    infrastructure::middleware::request_id_middleware,
    infrastructure::repositories::{
        CredentialRepository, ElevenLabsTtsRepository, GeminiTtsRepository, ImagePromptRepository,
        TtsRepository,
    },
};

/// Wire repositories, pools, services and controllers into a ready router
pub async fn create_app(
    config: &Config,
    credential_repo: Arc<dyn CredentialRepository>,
) -> anyhow::Result<Router> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    // 1. Credential pools (stored keys win over the environment seed)
    tracing::info!("Loading credential pools...");
    let gemini_pool = CredentialPool::load(
        ProviderId::Gemini,
        config.gemini_api_keys.clone(),
        config.gemini_fallback_key.clone(),
        credential_repo.clone(),
    )
    .await?;
    let elevenlabs_pool = CredentialPool::load(
        ProviderId::ElevenLabs,
        config.elevenlabs_api_keys.clone(),
        None,
        credential_repo,
    )
    .await?;
    let pools = Arc::new(CredentialPools::new([gemini_pool, elevenlabs_pool]));

    // 2. Provider repositories
    let gemini_repo = Arc::new(GeminiTtsRepository::new(
        http_client.clone(),
        config.gemini_settings(),
    ));
    let elevenlabs_repo = Arc::new(ElevenLabsTtsRepository::new(
        http_client,
        config.elevenlabs_settings(),
    ));
    let providers: Vec<Arc<dyn TtsRepository>> = vec![gemini_repo.clone(), elevenlabs_repo];
    let image_prompts: Arc<dyn ImagePromptRepository> = gemini_repo;

    // 3. Services
    let settings = TtsSettings {
        max_input_chars: config.max_input_chars,
        context_excerpt_chars: config.context_excerpt_chars,
        failover: FailoverPolicy {
            transient_backoff: Duration::from_millis(config.retry_backoff_ms),
        },
    };
    let tts_service = Arc::new(TtsService::new(
        providers,
        pools.clone(),
        Some(image_prompts),
        settings,
    ));

    // 4. Controllers
    let tts_controller = Arc::new(TtsController::new(tts_service));
    let credentials_controller = Arc::new(CredentialsController::new(pools.clone()));

    Ok(build_router(pools, tts_controller, credentials_controller))
}

/// Build the application router with every route and layer attached
pub fn build_router(
    pools: Arc<CredentialPools>,
    tts_controller: Arc<TtsController>,
    credentials_controller: Arc<CredentialsController>,
) -> Router {
    let tts_routes = Router::new()
        .route("/api/tts/synthesize", post(TtsController::synthesize))
        .route(
            "/api/tts/synthesize/stream",
            post(TtsController::synthesize_stream),
        )
        .with_state(tts_controller);

    let credential_routes = Router::new()
        .route("/api/credentials", get(CredentialsController::list))
        .route(
            "/api/credentials/:provider",
            put(CredentialsController::replace),
        )
        .with_state(credentials_controller);

    let catalog_routes = Router::new()
        .route("/api/voices", get(catalog::list_voices))
        .route("/api/languages", get(catalog::list_languages));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pools)
        .merge(tts_routes)
        .merge(credential_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

use narration_backend::infrastructure::config::{Config, LogFormat};
use narration_backend::infrastructure::http::{create_app, start_http_server};
use narration_backend::infrastructure::repositories::{
    CredentialRepository, FileCredentialRepository, InMemoryCredentialRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting narration backend on {}:{}",
        config.host,
        config.port
    );

    let credential_repo: Arc<dyn CredentialRepository> = match &config.credential_store_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file credential store");
            Arc::new(FileCredentialRepository::new(path.clone()))
        }
        None => {
            tracing::warn!("CREDENTIAL_STORE_PATH not set, key changes and cursors are lost on restart");
            Arc::new(InMemoryCredentialRepository::new())
        }
    };

    let app = create_app(&config, credential_repo).await?;

    start_http_server(Arc::new(config), app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "narration_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

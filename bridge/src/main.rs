use bridge::api::{self, AppState};
use bridge::config::Config;
use bridge::credentials::HttpCredentialStore;
use clap::Parser;
use crm::client::CrmClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_file(&cli.config)?;

    let store = HttpCredentialStore::new(
        config.credential_store.base_url.as_str(),
        &config.credential_store.api_key,
    );
    let state = AppState {
        store: Arc::new(store),
        crm: CrmClient::new(config.crm.base_url.as_str()),
    };

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "contact-bridge listening");
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}

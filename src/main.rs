use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use headhunt_viewer_backend::api;
use headhunt_viewer_backend::config::ViewerConfig;
use headhunt_viewer_backend::external::PortalTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ViewerConfig::from_env();

    // Initialize portal transport
    let portal = PortalTransport::new(config.portal_base_url.clone(), config.request_timeout)?;

    let addr: SocketAddr = config.bind_address().parse()?;
    let portal_url = config.portal_base_url.clone();

    let state = api::AppState::new(config, Arc::new(portal));
    let app = api::router(state);

    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("🔀 Proxying host page requests to {}", portal_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

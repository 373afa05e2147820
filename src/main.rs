use std::sync::Arc;

use anyhow::Result;
use axum::{Router, serve};
use dotenv::dotenv;
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService,
    streamable_http_server::session::local::LocalSessionManager,
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod mcp;
use mcp::{
    auth::{self, GithubAuth},
    config::{BIND_ADDRESS, GithubAuthConfig, OuraConfig},
    http::OuraClient,
    oura::OuraMcp,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load variables from .env file if it exists into the environment
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let oura_config = OuraConfig::from_env();
    if oura_config.api_token.is_none() {
        warn!("OURA_API_TOKEN is not set; every tool call will report it as not configured");
    }
    let client = Arc::new(OuraClient::new(oura_config));

    info!("Setting up the Streamable HTTP Service for the Oura MCP server");
    let service = StreamableHttpService::new(
        move || Ok(OuraMcp::new(Arc::clone(&client))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let mut router = Router::new().nest_service("/mcp", service);
    if let Some(github) = GithubAuthConfig::from_env() {
        info!(callback = %github.callback_url(), "GitHub OAuth enabled for /mcp");
        router = auth::protect(router, GithubAuth::new(&github)?);
    } else {
        info!("GitHub OAuth not configured; /mcp is open");
    }

    info!("Starting server on {}", BIND_ADDRESS);
    let tcp_listener = TcpListener::bind(BIND_ADDRESS).await?;

    // Graceful shutdown on CTRL+C
    let shutdown = async {
        signal::ctrl_c().await.unwrap_or_else(|e| {
            eprintln!("failed to install CTRL+C handler: {e}");
        });
    };

    serve(tcp_listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

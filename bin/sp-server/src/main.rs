//! SheetPress Server
//!
//! HTTP service that publishes Google Sheets tables as JSON files in a
//! GitHub repository. Exposes a token-guarded admin API for single and
//! batch publishes and a read-only table registry for viewers.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use sp_api::create_router;
use sp_config::ConfigLoader;
use sp_gauth::{ServiceAccountAuthenticator, ServiceAccountKey};
use sp_github::{GitHubClient, GitHubTarget};
use sp_publisher::{LiveSheetSource, TablePublisher};
use sp_sheets::SheetsClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for local development)
    let _ = dotenvy::dotenv();

    sp_common::logging::init_logging("sp-server");

    info!("Starting SheetPress server");

    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    // One HTTP client shared by the Google and GitHub integrations
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let key = ServiceAccountKey::from_json(&config.google.service_account_json)
        .context("failed to parse service account key")?;
    let authenticator = ServiceAccountAuthenticator::new(key, http_client.clone());
    let sheets = SheetsClient::new(config.google.api_base.clone(), http_client.clone());

    let source = Arc::new(LiveSheetSource::new(
        authenticator,
        sheets,
        config.google.spreadsheet_id.clone(),
    ));

    let github = Arc::new(GitHubClient::new(
        config.github.api_base.clone(),
        GitHubTarget {
            repo: config.github.repo.clone(),
            branch: config.github.branch.clone(),
            token: config.github.token.clone(),
        },
        http_client,
    ));

    let publisher = Arc::new(TablePublisher::new(source, github));

    info!(
        tables = config.tables.len(),
        repo = %config.github.repo,
        branch = %config.github.branch,
        "Publisher configured"
    );

    let app = create_router(
        Arc::new(config.auth.clone()),
        Arc::new(config.tables.clone()),
        publisher,
    )
    .layer(TraceLayer::new_for_http())
    .layer(build_cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    info!(addr = %addr, "Starting HTTP server");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("SheetPress server shutdown complete");
    Ok(())
}

/// Build the CORS layer from configured origins; "*" means any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => {
                tracing::error!("failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

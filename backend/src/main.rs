//! Custom Metric Provider - Backend Server
//!
//! Computes generative-AI quality metrics for Watson OpenScale custom monitor
//! runs and publishes them back to OpenScale.

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use crate::config::Config;

use external::{GovernanceClient, IamAuthenticator, OpenScaleClient, RemoteEvaluator};
use services::{EvaluationService, MonitorService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub monitor: MonitorService,
    pub evaluation: EvaluationService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custom_metric=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::load()?;

    tracing::info!("Starting Custom Metric Provider");
    tracing::info!("Environment: {}", config.environment);

    let state = build_state(config.clone())?;

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wire the OpenScale and evaluator clients into the services
fn build_state(config: Config) -> anyhow::Result<AppState> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.openscale.timeout_secs))
        .build()?;

    let auth = IamAuthenticator::new(
        http_client.clone(),
        config.openscale.iam_url.clone(),
        config.openscale.api_key.clone(),
    );

    let openscale = OpenScaleClient::new(
        http_client.clone(),
        auth.clone(),
        config.openscale.base_url.clone(),
        config.openscale.service_instance_id.clone(),
    );

    let remote: Option<Arc<dyn RemoteEvaluator>> =
        config.evaluation.governance_endpoint.clone().map(|endpoint| {
            tracing::info!("Model-based metrics evaluated by {}", endpoint);
            Arc::new(GovernanceClient::new(http_client.clone(), auth.clone(), endpoint))
                as Arc<dyn RemoteEvaluator>
        });

    Ok(AppState {
        monitor: MonitorService::new(Arc::new(openscale), config.evaluation.payload_limit),
        evaluation: EvaluationService::new(remote),
        config: Arc::new(config),
    })
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
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
    tracing::info!("signal received, starting graceful shutdown");
}

//! # screening-server
//!
//! Web front end that screens submitted transactions with a pre-trained
//! isolation forest.

use anyhow::Context;
use axum::{extract::State, routing::get, routing::post, Json, Router};
use clap::Parser;
use screening::Screener;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod page;
mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    screener: Screener,
    source: Arc<str>,
}

/// Liveness probe - is the server running?
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe - which artifacts are being served?
async fn readiness(State(state): State<AppState>) -> Json<serde_json::Value> {
    let encoders = state.screener.encoders();
    Json(serde_json::json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "model": {
            "name": state.screener.model().name(),
            "source": state.source.as_ref(),
        },
        "encoders": {
            "DIV_NAME": encoders.division().len(),
            "MERCHANT": encoders.merchant().len(),
            "CAT_DESC": encoders.category().len(),
        }
    }))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/predict", post(routes::predict))
        // Health endpoints (Kubernetes-compatible)
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/health", get(liveness))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "screening_server=info,screening_core=info,tower_http=info".into()
            }),
        )
        .init();

    let args = config::Args::parse();
    let artifacts = args
        .artifact_config()
        .context("invalid artifact configuration")?;
    let source = artifacts.model.to_string();

    // Loading may block on the tracking server, keep it off the async workers.
    let screener = tokio::task::spawn_blocking(move || Screener::load(&artifacts))
        .await
        .context("artifact loading task failed")?
        .with_context(|| format!("failed to load screening artifacts from {source}"))?;

    let state = AppState {
        screener,
        source: Arc::from(source.as_str()),
    };

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("cannot bind {}:{}", args.host, args.port))?;

    tracing::info!(
        "screening-server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?
    );

    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}

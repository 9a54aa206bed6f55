// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{embed_handler, health_handler};
use crate::config::GatewayConfig;
use crate::embeddings::EmbeddingModelManager;
use crate::gateway::EmbeddingGateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<EmbeddingGateway>,
    /// Local model cache, reported by /health when present
    pub model_manager: Option<Arc<EmbeddingModelManager>>,
}

impl AppState {
    pub fn new(gateway: EmbeddingGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            model_manager: None,
        }
    }

    pub fn with_model_manager(mut self, manager: Arc<EmbeddingModelManager>) -> Self {
        self.model_manager = Some(manager);
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Embedding gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Embedding gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

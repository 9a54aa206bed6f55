// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use embedding_gateway::{
    api::{start_server, AppState},
    version, EmbeddingGateway, EmbeddingModelManager, GatewayConfig,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::parse();
    info!("Starting {}", version::get_version_string());
    info!("Configuration: {:?}", config);

    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; openai requests will fail");
    }
    if config.claude_api_key.is_none() {
        warn!("CLAUDE_API_KEY not set; claude requests will fail");
    }

    let model_manager = Arc::new(EmbeddingModelManager::new(config.model_config()));
    let gateway = EmbeddingGateway::from_config(&config, model_manager.clone());
    let state = AppState::new(gateway).with_model_manager(model_manager);

    info!("Embed: POST http://{}/embed", config.bind_address());
    start_server(&config, state).await
}

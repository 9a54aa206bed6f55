// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use embedding_gateway::api::{create_app, AppState, HealthResponse};
use embedding_gateway::embeddings::{EmbeddingModelConfig, EmbeddingModelManager, MockEncoder};
use embedding_gateway::{EmbeddingGateway, GatewayConfig, Provider};
use std::sync::Arc;
use tower::ServiceExt;

async fn get_health(state: AppState) -> HealthResponse {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = create_app(state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_lists_registered_providers() {
    let gateway = EmbeddingGateway::new()
        .with_encoder(Provider::HuggingFace, Arc::new(MockEncoder::new(4)));

    let health = get_health(AppState::new(gateway)).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, embedding_gateway::version::VERSION);
    assert_eq!(health.providers, vec!["huggingface".to_string()]);
    assert!(health.loaded_models.is_empty());
}

#[tokio::test]
async fn test_health_with_configured_gateway() {
    let config = GatewayConfig::default();
    let manager = Arc::new(EmbeddingModelManager::new(EmbeddingModelConfig {
        offline: true,
        ..config.model_config()
    }));
    let gateway = EmbeddingGateway::from_config(&config, manager.clone());

    let health = get_health(AppState::new(gateway).with_model_manager(manager)).await;
    assert_eq!(health.providers, vec!["huggingface", "openai", "claude"]);
    assert!(health.loaded_models.is_empty());
    assert_eq!(health.version, embedding_gateway::version::VERSION);
}

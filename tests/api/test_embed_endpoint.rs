// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed endpoint tests
//!
//! Drive the axum router directly with `oneshot`. Providers are backed by
//! `MockEncoder` except for the ignored test that needs the real ONNX model.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use embedding_gateway::api::{create_app, AppState, EmbedResponse, ErrorResponse};
use embedding_gateway::embeddings::{
    EmbeddingModelConfig, EmbeddingModelManager, HuggingFaceEncoder, MockEncoder,
};
use embedding_gateway::{EmbeddingGateway, Provider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn mock_app() -> Router {
    let gateway = EmbeddingGateway::new()
        .with_encoder(Provider::HuggingFace, Arc::new(MockEncoder::new(384)))
        .with_encoder(Provider::OpenAi, Arc::new(MockEncoder::new(1536)))
        .with_encoder(
            Provider::Claude,
            Arc::new(MockEncoder::failing(
                "Claude embedding API error (401 Unauthorized): invalid x-api-key",
            )),
        );
    create_app(AppState::new(gateway))
}

async fn post_embed(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/embed")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_default_provider_and_model() {
    let (status, body) = post_embed(mock_app(), json!({ "text": "hello" })).await;

    assert_eq!(status, StatusCode::OK);
    let response: EmbedResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.provider, "huggingface");
    assert_eq!(response.model, "all-MiniLM-L6-v2");
    assert_eq!(response.embedding.len(), 384);
    assert!(response.is_finite());
}

#[tokio::test]
async fn test_empty_model_uses_provider_default() {
    let (status, body) = post_embed(
        mock_app(),
        json!({ "text": "hello", "provider": "openai", "model": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "text-embedding-ada-002");
    assert_eq!(body["provider"], "openai");
}

#[tokio::test]
async fn test_explicit_model_echoed_verbatim() {
    for model in ["all-mpnet-base-v2", "definitely/not-a-model", "  spaced  "] {
        let (status, body) = post_embed(
            mock_app(),
            json!({ "text": "hello", "provider": "huggingface", "model": model }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], model);
    }
}

#[tokio::test]
async fn test_unknown_provider_returns_400() {
    for provider in ["cohere", "HuggingFace", "", "open ai"] {
        let (status, body) = post_embed(
            mock_app(),
            json!({ "text": "hello", "provider": provider }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "provider {:?}", provider);
        let error: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(error.detail, "Unknown provider");
    }
}

#[tokio::test]
async fn test_blank_text_returns_400() {
    for text in ["", "   ", "\n"] {
        let (status, body) = post_embed(mock_app(), json!({ "text": text })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "detail": "text cannot be empty or contain only whitespace" })
        );
    }
}

#[tokio::test]
async fn test_provider_failure_returns_500_with_message() {
    let (status, body) = post_embed(
        mock_app(),
        json!({ "text": "hello", "provider": "claude" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Claude embedding API error (401 Unauthorized): invalid x-api-key"
    );
}

#[tokio::test]
async fn test_missing_text_is_client_error() {
    let (status, _) = post_embed(mock_app(), json!({ "provider": "huggingface" })).await;
    assert!(status.is_client_error(), "got {}", status);
}

#[tokio::test]
async fn test_identical_requests_identical_vectors() {
    let app = mock_app();
    let (_, a) = post_embed(app.clone(), json!({ "text": "repeat me" })).await;
    let (_, b) = post_embed(app, json!({ "text": "repeat me" })).await;
    assert_eq!(a["embedding"], b["embedding"]);
}

#[tokio::test]
async fn test_offline_missing_local_model_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(EmbeddingModelManager::new(EmbeddingModelConfig {
        models_dir: dir.path().to_path_buf(),
        offline: true,
        ..Default::default()
    }));
    let gateway = EmbeddingGateway::new().with_encoder(
        Provider::HuggingFace,
        Arc::new(HuggingFaceEncoder::new(manager.clone())),
    );
    let app = create_app(AppState::new(gateway).with_model_manager(manager));

    let (status, body) = post_embed(app, json!({ "text": "hello", "model": "no-such-model" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("no-such-model"), "detail: {}", detail);
}

/// Real all-MiniLM-L6-v2 through the full HTTP stack. Needs the model under
/// ./models/all-MiniLM-L6-v2-onnx/ or network access to the Hugging Face Hub.
#[tokio::test]
#[ignore]
async fn test_huggingface_real_model() {
    let manager = Arc::new(EmbeddingModelManager::new(EmbeddingModelConfig::default()));
    let gateway = EmbeddingGateway::new().with_encoder(
        Provider::HuggingFace,
        Arc::new(HuggingFaceEncoder::new(manager.clone())),
    );
    let app = create_app(AppState::new(gateway).with_model_manager(manager.clone()));

    let (status, first) = post_embed(
        app.clone(),
        json!({ "text": "hello", "provider": "huggingface" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: EmbedResponse = serde_json::from_value(first.clone()).unwrap();
    assert_eq!(response.embedding.len(), 384);
    assert!(response.is_finite());

    let (_, second) = post_embed(app, json!({ "text": "hello" })).await;
    assert_eq!(first["embedding"], second["embedding"]);

    // Second request reused the cached model
    assert_eq!(manager.load_attempts(), 1);
}

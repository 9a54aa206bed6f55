// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::embeddings::ModelInfo;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub providers: Vec<String>,
    pub loaded_models: Vec<ModelInfo>,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded_models = match &state.model_manager {
        Some(manager) => manager.list_models().await,
        None => Vec::new(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION.to_string(),
        providers: state
            .gateway
            .providers()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
        loaded_models,
    })
}

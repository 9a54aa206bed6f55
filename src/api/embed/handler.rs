// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::gateway::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "text": "hello", "provider": "huggingface", "model": "" }
/// ```
///
/// # Errors
/// - 400 `{"detail": "Unknown provider"}`
/// - 400 `{"detail": "text cannot be empty or contain only whitespace"}`
/// - 500 `{"detail": "<provider error message>"}`
pub async fn embed_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    debug!("Embed request received for provider {:?}", request.provider);

    let response = state.gateway.embed(&request).await?;

    info!(
        "Embedding generated: provider={}, model={}, dimensions={}",
        response.provider,
        response.model,
        response.dimensions()
    );
    Ok(Json(response))
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Gateway
//!
//! Validates an [`EmbedRequest`], resolves the provider and model, and
//! dispatches to the encoder registered for that provider.

pub mod request;
pub mod response;

pub use request::EmbedRequest;
pub use response::EmbedResponse;

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::embeddings::{
    ClaudeEncoder, EmbeddingModelManager, HuggingFaceEncoder, OpenAiEncoder, Provider, TextEncoder,
};

/// Errors surfaced by [`EmbeddingGateway::embed`]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Provider outside the recognised set, or one with no registered encoder
    #[error("Unknown provider")]
    UnsupportedProvider { provider: String },

    #[error("text cannot be empty or contain only whitespace")]
    InvalidText,

    /// Underlying encoder failure; the message is passed through verbatim
    #[error("{0}")]
    Provider(String),
}

pub struct EmbeddingGateway {
    encoders: HashMap<Provider, Arc<dyn TextEncoder>>,
}

impl Default for EmbeddingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingGateway {
    /// Gateway with no providers registered
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Gateway with all three providers wired from configuration
    pub fn from_config(config: &GatewayConfig, model_manager: Arc<EmbeddingModelManager>) -> Self {
        Self::new()
            .with_encoder(
                Provider::HuggingFace,
                Arc::new(HuggingFaceEncoder::new(model_manager)),
            )
            .with_encoder(
                Provider::OpenAi,
                Arc::new(OpenAiEncoder::new(
                    config.openai_api_key.clone(),
                    config.openai_base_url.clone(),
                )),
            )
            .with_encoder(
                Provider::Claude,
                Arc::new(ClaudeEncoder::new(
                    config.claude_api_key.clone(),
                    config.claude_base_url.clone(),
                )),
            )
    }

    /// Registers (or replaces) the encoder for `provider`
    pub fn with_encoder(mut self, provider: Provider, encoder: Arc<dyn TextEncoder>) -> Self {
        self.encoders.insert(provider, encoder);
        self
    }

    /// Registered providers in canonical order
    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.encoders.contains_key(p))
            .collect()
    }

    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, GatewayError> {
        let provider: Provider = request.provider.parse()?;
        let encoder = self
            .encoders
            .get(&provider)
            .ok_or_else(|| GatewayError::UnsupportedProvider {
                provider: request.provider.clone(),
            })?;

        request.validate()?;

        let model = provider.resolve_model(&request.model);
        debug!("Embedding {} chars with {}/{}", request.text.len(), provider, model);

        let embedding = encoder.encode(&request.text, &model).await.map_err(|e| {
            warn!("Provider {} failed for model {}: {:#}", provider, model, e);
            GatewayError::Provider(format!("{:#}", e))
        })?;

        Ok(EmbedResponse {
            embedding,
            provider: provider.as_str().to_string(),
            model,
        })
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding providers
//!
//! Every provider is a [`TextEncoder`]: given a text and a resolved model
//! name it returns one embedding vector. The gateway keeps a table from
//! [`Provider`] to encoder and never special-cases a provider itself.
//!
//! - `huggingface`: local ONNX sentence transformer (see [`OnnxEmbeddingModel`])
//! - `openai`: remote OpenAI embeddings API
//! - `claude`: remote Claude embeddings API

pub mod claude;
pub mod huggingface;
pub mod mock;
pub mod model_manager;
pub mod onnx_model;
pub mod openai;

pub use claude::ClaudeEncoder;
pub use huggingface::HuggingFaceEncoder;
pub use mock::MockEncoder;
pub use model_manager::{
    EmbeddingModelConfig, EmbeddingModelManager, ModelCache, ModelFiles, ModelInfo,
};
pub use onnx_model::OnnxEmbeddingModel;
pub use openai::OpenAiEncoder;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::gateway::GatewayError;

/// Converts text into an embedding vector for a named model.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encodes `text` with `model`. The model name is passed through as-is;
    /// unknown names surface as errors from the underlying backend.
    async fn encode(&self, text: &str, model: &str) -> Result<Vec<f32>>;
}

/// Recognised embedding providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    HuggingFace,
    OpenAi,
    Claude,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::HuggingFace, Provider::OpenAi, Provider::Claude];

    /// Wire name used in requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "huggingface",
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
        }
    }

    /// Model used when a request leaves `model` empty
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "all-MiniLM-L6-v2",
            Provider::OpenAi => "text-embedding-ada-002",
            Provider::Claude => "claude-3-sonnet-20240229",
        }
    }

    /// Returns `requested` unless it is empty, in which case the default model.
    pub fn resolve_model(&self, requested: &str) -> String {
        if requested.is_empty() {
            self.default_model().to_string()
        } else {
            requested.to_string()
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| GatewayError::UnsupportedProvider {
                provider: s.to_string(),
            })
    }
}

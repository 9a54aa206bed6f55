// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed

use super::GatewayError;
use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// # Fields
/// - `text`: Text to embed (required, must contain a non-whitespace character)
/// - `provider`: "huggingface" (default), "openai" or "claude"
/// - `model`: Model override; empty means the provider's default
///
/// `provider` is kept as a plain string so that unrecognised values reach
/// the gateway and are answered with "Unknown provider".
///
/// # Example
/// ```json
/// {
///   "text": "Hello world",
///   "provider": "huggingface",
///   "model": "all-MiniLM-L6-v2"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub text: String,

    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub model: String,
}

fn default_provider() -> String {
    "huggingface".to_string()
}

impl EmbedRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider: default_provider(),
            model: String::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rejects empty and whitespace-only text
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.text.trim().is_empty() {
            return Err(GatewayError::InvalidText);
        }
        Ok(())
    }
}

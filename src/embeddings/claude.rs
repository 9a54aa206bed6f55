// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Claude embeddings API client
//!
//! Sends `{model, input}` to `POST {base_url}/v1/embeddings` with the
//! Anthropic auth headers. The vector is read from a top-level `embedding`
//! field, or from `data[0].embedding` for list-shaped responses.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextEncoder;

pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeEncoder {
    api_key: Option<String>,
    base_url: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_embedding(self) -> Option<Vec<f32>> {
        self.embedding
            .or_else(|| self.data.into_iter().next().map(|d| d.embedding))
    }
}

impl ClaudeEncoder {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl TextEncoder for ClaudeEncoder {
    async fn encode(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("CLAUDE_API_KEY is not set"))?;

        debug!("Requesting Claude embedding with model {}", model);
        let resp = self
            .http_client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&EmbeddingRequest { model, input: text })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Claude embedding API error ({status}): {body}");
        }

        let response: EmbeddingResponse = resp.json().await?;
        response
            .into_embedding()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned by Claude"))
    }
}

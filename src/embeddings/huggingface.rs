// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Local sentence-transformer encoder backed by [`EmbeddingModelManager`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::{EmbeddingModelManager, TextEncoder};

pub struct HuggingFaceEncoder {
    manager: Arc<EmbeddingModelManager>,
}

impl HuggingFaceEncoder {
    pub fn new(manager: Arc<EmbeddingModelManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<EmbeddingModelManager> {
        &self.manager
    }
}

#[async_trait]
impl TextEncoder for HuggingFaceEncoder {
    async fn encode(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let model = self.manager.get_model(model).await?;
        let text = text.to_string();

        // ONNX inference is CPU bound
        tokio::task::spawn_blocking(move || model.embed(&text))
            .await
            .context("Embedding task failed")?
    }
}

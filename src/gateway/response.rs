// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// # Example
/// ```json
/// {
///   "embedding": [0.1, 0.2, ...],
///   "provider": "huggingface",
///   "model": "all-MiniLM-L6-v2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,

    /// Resolved provider wire name
    pub provider: String,

    /// Resolved model name
    pub model: String,
}

impl EmbedResponse {
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    pub fn is_finite(&self) -> bool {
        self.embedding.iter().all(|v| v.is_finite())
    }
}

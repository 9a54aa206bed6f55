// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Deterministic encoder for tests
//!
//! Produces hash-seeded unit vectors so gateway and HTTP tests run without
//! model files or network access.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::TextEncoder;

pub struct MockEncoder {
    dimension: usize,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Encoder whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            dimension: 0,
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn generate(&self, text: &str, model: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        model.hash(&mut hasher);
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407)
                ^ (i as u64);
            let value = (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        super::onnx_model::l2_normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl TextEncoder for MockEncoder {
    async fn encode(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        Ok(self.generate(text, model))
    }
}

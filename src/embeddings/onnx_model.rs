// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence-transformer export (`model.onnx` + `tokenizer.json`) with
//! ONNX Runtime and reproduces the sentence-transformers `encode` output:
//! - BERT tokenization with truncation to `max_length`
//! - Mean pooling over token embeddings, weighted by the attention mask
//! - L2 normalization
//!
//! The output dimension is read from the model during loading, so any
//! BERT-style export works (384 for all-MiniLM-L6-v2).

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, ArrayView2, Axis};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Maximum sequence length used by sentence-transformers for MiniLM models
pub const DEFAULT_MAX_LENGTH: usize = 256;

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// The session sits behind a mutex because `Session::run` needs `&mut`.
/// Callers are expected to run [`OnnxEmbeddingModel::embed`] on a blocking
/// thread.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads a model from disk. Blocking: builds the ONNX session and runs
    /// one validation inference to learn the output dimension.
    ///
    /// # Errors
    /// - model or tokenizer file missing or invalid
    /// - ONNX Runtime initialization fails
    /// - model output is not `[batch, seq_len, hidden]` or `[batch, hidden]`
    pub fn load<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading ONNX embedding model {} from {}", model_name, model_path.display());

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: DEFAULT_MAX_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        // Outputs must be dropped before the session moves into the mutex
        let dimension = {
            let (input_ids, attention_mask, token_type_ids) =
                Self::tokenize(&tokenizer, "validation test")?;

            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids)?,
                "attention_mask" => Value::from_array(attention_mask)?,
                "token_type_ids" => Value::from_array(token_type_ids)?
            ])?;

            // Index [0]: output names differ between exports
            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;
            let shape = output_tensor.shape();

            match shape.len() {
                3 => shape[2],
                2 => shape[1],
                _ => anyhow::bail!(
                    "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden] or [batch, hidden])",
                    shape
                ),
            }
        };

        if dimension == 0 {
            anyhow::bail!("Model {} reports a zero embedding dimension", model_name);
        }

        info!("ONNX embedding model {} loaded ({} dimensions)", model_name, dimension);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
            normalize: true,
        })
    }

    /// Disables or enables L2 normalization of the pooled output
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    fn tokenize(
        tokenizer: &Tokenizer,
        text: &str,
    ) -> Result<(Array2<i64>, Array2<i64>, Array2<i64>)> {
        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = vec![0i64; input_ids.len()];
        let len = input_ids.len();

        Ok((
            Array2::from_shape_vec((1, len), input_ids)
                .context("Failed to create input_ids array")?,
            Array2::from_shape_vec((1, len), attention_mask)
                .context("Failed to create attention_mask array")?,
            Array2::from_shape_vec((1, len), token_type_ids)
                .context("Failed to create token_type_ids array")?,
        ))
    }

    /// Generates the embedding for a single text. Blocking.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask, token_type_ids) = Self::tokenize(&self.tokenizer, text)?;
        let mask: Vec<i64> = attention_mask.iter().copied().collect();

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids)?,
            "attention_mask" => Value::from_array(attention_mask)?,
            "token_type_ids" => Value::from_array(token_type_ids)?
        ])?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let mut embedding = match output_array.ndim() {
            // Token-level output: [batch, seq_len, hidden]
            3 => {
                let tokens = output_array
                    .index_axis(Axis(0), 0)
                    .into_dimensionality::<ndarray::Ix2>()
                    .context("Unexpected token embedding shape")?;
                mean_pool(tokens, &mask)
            }
            // Already pooled: [batch, hidden]
            2 => output_array.index_axis(Axis(0), 0).iter().copied().collect(),
            n => anyhow::bail!("Unexpected output rank {}", n),
        };

        if self.normalize {
            l2_normalize(&mut embedding);
        }

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        debug!("Encoded {} tokens with {}", mask.len(), self.model_name);
        Ok(embedding)
    }

    /// Number of non-padding tokens the model would see for `text`
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Averages token vectors over positions where `mask` is non-zero.
pub fn mean_pool(tokens: ArrayView2<f32>, mask: &[i64]) -> Vec<f32> {
    let hidden_dim = tokens.shape()[1];
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (row, &m) in tokens.outer_iter().zip(mask.iter()) {
        let weight = m as f32;
        sum_mask += weight;
        for (acc, &value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * weight;
        }
    }

    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }
    pooled
}

/// Scales `values` to unit length; zero vectors are left unchanged.
pub fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}

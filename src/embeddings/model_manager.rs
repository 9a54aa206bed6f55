// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Model Manager
//!
//! Lazily loads local ONNX embedding models by name and keeps them for the
//! lifetime of the process. Model files are looked up under the configured
//! models directory first and otherwise fetched from the Hugging Face Hub.
//!
//! Concurrent first requests for the same model name share one load: each
//! name owns a `OnceCell`, and only the caller that wins initialization runs
//! the loader. A failed load removes the name's cell, so the next request
//! retries and names that never load are not retained.

use crate::embeddings::OnnxEmbeddingModel;
use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Hub organisation assumed for model names without an owner prefix
pub const DEFAULT_HUB_ORG: &str = "sentence-transformers";

/// Configuration for locating and loading local embedding models
#[derive(Debug, Clone)]
pub struct EmbeddingModelConfig {
    /// Directory holding `<model>-onnx/{model.onnx,tokenizer.json}`
    pub models_dir: PathBuf,
    /// Hugging Face cache directory (hf-hub default when `None`)
    pub hf_cache_dir: Option<PathBuf>,
    /// Never download; only use files under `models_dir`
    pub offline: bool,
    /// ONNX Runtime intra-op threads per model
    pub intra_threads: usize,
}

impl Default for EmbeddingModelConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            hf_cache_dir: None,
            offline: false,
            intra_threads: 4,
        }
    }
}

/// Resolved on-disk files for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Expected layout inside a local model directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model_path: dir.join("model.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
        }
    }

    pub fn exist(&self) -> bool {
        self.model_path.is_file() && self.tokenizer_path.is_file()
    }
}

/// Information about a loaded embedding model
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub dimensions: usize,
}

/// Process-wide map from model name to a lazily constructed model
pub struct ModelCache<M> {
    slots: Mutex<HashMap<String, Arc<OnceCell<Arc<M>>>>>,
    constructions: AtomicUsize,
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            constructions: AtomicUsize::new(0),
        }
    }
}

impl<M> ModelCache<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached model for `name`, running `load` if no model is
    /// cached yet. At most one `load` for a given name runs at a time.
    pub async fn get_or_load<F, Fut>(&self, name: &str, load: F) -> Result<Arc<M>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<M>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(name.to_string()).or_default().clone()
        };

        if let Some(model) = slot.get() {
            debug!("Model cache hit: {}", name);
            return Ok(model.clone());
        }

        let result = slot
            .get_or_try_init(|| async {
                debug!("Model cache miss: {}", name);
                self.constructions.fetch_add(1, Ordering::SeqCst);
                load().await.map(Arc::new)
            })
            .await;

        match result {
            Ok(model) => {
                // A waiter may have initialized a slot that a failed loader evicted
                self.slots
                    .lock()
                    .await
                    .entry(name.to_string())
                    .or_insert_with(|| slot.clone());
                Ok(model.clone())
            }
            Err(e) => {
                self.evict_empty(name, &slot).await;
                Err(e)
            }
        }
    }

    /// Drops the slot for `name` if it is still `slot` and holds no model,
    /// so names that never load do not stay in the map.
    async fn evict_empty(&self, name: &str, slot: &Arc<OnceCell<Arc<M>>>) {
        let mut slots = self.slots.lock().await;
        let stale = slots
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            slots.remove(name);
        }
    }

    /// Number of names currently holding a slot, loaded or in flight
    pub async fn slot_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Models that finished loading, sorted by name
    pub async fn loaded(&self) -> Vec<(String, Arc<M>)> {
        let slots = self.slots.lock().await;
        let mut loaded: Vec<(String, Arc<M>)> = slots
            .iter()
            .filter_map(|(name, slot)| slot.get().map(|m| (name.clone(), m.clone())))
            .collect();
        loaded.sort_by(|a, b| a.0.cmp(&b.0));
        loaded
    }

    /// Number of times a loader has been started (successful or not)
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

/// Manager for local ONNX embedding models
pub struct EmbeddingModelManager {
    config: EmbeddingModelConfig,
    cache: ModelCache<OnnxEmbeddingModel>,
}

impl EmbeddingModelManager {
    pub fn new(config: EmbeddingModelConfig) -> Self {
        Self {
            config,
            cache: ModelCache::new(),
        }
    }

    pub fn config(&self) -> &EmbeddingModelConfig {
        &self.config
    }

    /// Gets a model by name, loading it on first use
    pub async fn get_model(&self, name: &str) -> Result<Arc<OnnxEmbeddingModel>> {
        self.cache
            .get_or_load(name, || self.load_model(name))
            .await
    }

    async fn load_model(&self, name: &str) -> Result<OnnxEmbeddingModel> {
        let files = self.resolve_files(name).await?;
        let model_name = name.to_string();
        let intra_threads = self.config.intra_threads;

        info!("Loading embedding model: {}", model_name);
        let model = tokio::task::spawn_blocking(move || {
            OnnxEmbeddingModel::load(
                model_name,
                files.model_path,
                files.tokenizer_path,
                intra_threads,
            )
        })
        .await
        .context("Model loading task failed")??;

        info!(
            "Loaded embedding model: {} ({} dimensions)",
            model.model_name(),
            model.dimension()
        );
        Ok(model)
    }

    /// Finds model files locally, or downloads them from the hub.
    pub async fn resolve_files(&self, name: &str) -> Result<ModelFiles> {
        if let Some(dir) = local_model_dir(&self.config.models_dir, name) {
            let files = ModelFiles::in_dir(&dir);
            if files.exist() {
                debug!("Using local model files for {} at {}", name, dir.display());
                return Ok(files);
            }
        }

        if self.config.offline {
            anyhow::bail!(
                "Model '{}' not found under {} and hub downloads are disabled",
                name,
                self.config.models_dir.display()
            );
        }

        let repo_id = hub_repo_id(name);
        info!("Fetching model {} from the Hugging Face Hub", repo_id);

        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(cache_dir) = &self.config.hf_cache_dir {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        let api = builder.build().context("Failed to initialise Hugging Face Hub client")?;
        let repo = api.model(repo_id.clone());

        let model_path = repo
            .get("onnx/model.onnx")
            .await
            .with_context(|| format!("Failed to download onnx/model.onnx for {}", repo_id))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .await
            .with_context(|| format!("Failed to download tokenizer.json for {}", repo_id))?;

        Ok(ModelFiles {
            model_path,
            tokenizer_path,
        })
    }

    /// Lists loaded models, sorted by name
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        self.cache
            .loaded()
            .await
            .into_iter()
            .map(|(name, model)| ModelInfo {
                name,
                dimensions: model.dimension(),
            })
            .collect()
    }

    pub fn load_attempts(&self) -> usize {
        self.cache.construction_count()
    }
}

/// Hub repository for a model name; bare names live under `sentence-transformers`.
pub fn hub_repo_id(name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", DEFAULT_HUB_ORG, name)
    }
}

/// Local directory for a model, or `None` when the name cannot be mapped to
/// a path inside `models_dir`.
pub fn local_model_dir(models_dir: &Path, name: &str) -> Option<PathBuf> {
    let safe = !name.is_empty()
        && !name.contains("..")
        && !name.starts_with('/')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if !safe {
        warn!("Model name {:?} cannot be mapped to a local directory", name);
        return None;
    }
    Some(models_dir.join(format!("{}-onnx", name.replace('/', "--"))))
}

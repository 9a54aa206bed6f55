// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Gateway configuration, from command-line flags or environment variables

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::embeddings::claude::DEFAULT_CLAUDE_BASE_URL;
use crate::embeddings::openai::DEFAULT_OPENAI_BASE_URL;
use crate::embeddings::EmbeddingModelConfig;

/// Embedding gateway
#[derive(Parser, Clone)]
#[command(name = "embedding-gateway")]
#[command(version)]
#[command(about = "HTTP service that turns text into embedding vectors", long_about = None)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP server
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory with local `<model>-onnx/` model folders
    #[arg(long, env = "MODELS_DIR", default_value = "./models")]
    pub models_dir: PathBuf,

    /// Hugging Face Hub cache directory
    #[arg(long, env = "HF_CACHE_DIR")]
    pub hf_cache_dir: Option<PathBuf>,

    /// Only use models already present in the models directory
    #[arg(long, env = "HF_HUB_OFFLINE", default_value_t = false)]
    pub offline: bool,

    /// ONNX Runtime intra-op threads per loaded model
    #[arg(long, env = "ONNX_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    #[arg(long, env = "CLAUDE_API_KEY", hide_env_values = true)]
    pub claude_api_key: Option<String>,

    #[arg(long, env = "CLAUDE_BASE_URL", default_value = DEFAULT_CLAUDE_BASE_URL)]
    pub claude_base_url: String,
}

impl GatewayConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_config(&self) -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            models_dir: self.models_dir.clone(),
            hf_cache_dir: self.hf_cache_dir.clone(),
            offline: self.offline,
            intra_threads: self.intra_threads,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            models_dir: PathBuf::from("./models"),
            hf_cache_dir: None,
            offline: false,
            intra_threads: 4,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            claude_api_key: None,
            claude_base_url: DEFAULT_CLAUDE_BASE_URL.to_string(),
        }
    }
}

// API keys are reported as present/absent only
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("models_dir", &self.models_dir)
            .field("hf_cache_dir", &self.hf_cache_dir)
            .field("offline", &self.offline)
            .field("intra_threads", &self.intra_threads)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("claude_api_key", &self.claude_api_key.as_ref().map(|_| "<set>"))
            .field("claude_base_url", &self.claude_base_url)
            .finish()
    }
}

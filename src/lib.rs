// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod gateway;
pub mod version;

pub use api::{create_app, AppState};
pub use config::GatewayConfig;
pub use embeddings::{EmbeddingModelManager, Provider, TextEncoder};
pub use gateway::{EmbedRequest, EmbedResponse, EmbeddingGateway, GatewayError};

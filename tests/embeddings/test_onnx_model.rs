// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests against the real all-MiniLM-L6-v2 export
//!
//! Model file paths (./models/all-MiniLM-L6-v2-onnx/) or network access to
//! the Hugging Face Hub are required, so these are ignored by default.

use embedding_gateway::embeddings::{
    EmbeddingModelConfig, EmbeddingModelManager, HuggingFaceEncoder, TextEncoder,
};
use std::sync::Arc;

fn manager() -> Arc<EmbeddingModelManager> {
    Arc::new(EmbeddingModelManager::new(EmbeddingModelConfig::default()))
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
#[ignore]
async fn test_minilm_dimensions_and_norm() {
    let manager = manager();
    let model = manager.get_model("all-MiniLM-L6-v2").await.unwrap();
    assert_eq!(model.dimension(), 384);

    let embedding = model.embed("hello").unwrap();
    assert_eq!(embedding.len(), 384);
    assert!(embedding.iter().all(|v| v.is_finite()));

    let norm = cosine(&embedding, &embedding).sqrt();
    assert!((norm - 1.0).abs() < 1e-3, "norm {}", norm);
}

#[tokio::test]
#[ignore]
async fn test_encoder_deterministic() {
    let encoder = HuggingFaceEncoder::new(manager());

    let a = encoder.encode("The cat sat on the mat", "all-MiniLM-L6-v2").await.unwrap();
    let b = encoder.encode("The cat sat on the mat", "all-MiniLM-L6-v2").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(encoder.manager().load_attempts(), 1);
}

#[tokio::test]
#[ignore]
async fn test_semantic_similarity_ordering() {
    let encoder = HuggingFaceEncoder::new(manager());

    let cat = encoder.encode("A cat sleeps on the sofa", "all-MiniLM-L6-v2").await.unwrap();
    let kitten = encoder.encode("A kitten naps on the couch", "all-MiniLM-L6-v2").await.unwrap();
    let finance = encoder.encode("Quarterly revenue grew by 4%", "all-MiniLM-L6-v2").await.unwrap();

    assert!(cosine(&cat, &kitten) > cosine(&cat, &finance));
}

#[tokio::test]
#[ignore]
async fn test_long_text_is_truncated() {
    let encoder = HuggingFaceEncoder::new(manager());
    let long_text = "word ".repeat(10_000);

    let embedding = encoder.encode(&long_text, "all-MiniLM-L6-v2").await.unwrap();
    assert_eq!(embedding.len(), 384);
}

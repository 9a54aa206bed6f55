// Version information for the embedding gateway

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Providers this build can dispatch to
pub const FEATURES: &[&str] = &["huggingface-onnx", "openai", "claude", "model-cache"];

/// Version string for startup logs
pub fn get_version_string() -> String {
    format!("embedding-gateway v{} ({})", VERSION, FEATURES.join(", "))
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! POST /embed: one text in, one vector out, from the selected provider.

pub mod handler;

pub use crate::gateway::{EmbedRequest, EmbedResponse};
pub use handler::embed_handler;

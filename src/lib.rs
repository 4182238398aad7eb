//! Storefront library -- e-commerce administrative backend.
//!
//! This crate provides the components for running the store's admin
//! API: request handling, bearer-token authentication, document
//! persistence, media upload gatewaying, and the generative-AI
//! integration behind the description generator and chatbot.

use std::sync::Arc;

pub mod ai;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod server;
pub mod store;

use crate::ai::TextModel;
use crate::config::Config;
use crate::media::MediaStorage;
use crate::store::DocumentStore;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Document store (SQLite or in-memory).
    pub store: Arc<dyn DocumentStore>,
    /// External media host gateway.
    pub media: Arc<dyn MediaStorage>,
    /// Generative text model.
    pub model: Arc<dyn TextModel>,
}

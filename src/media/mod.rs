//! Media ingestion: pluggable backends for the external image host.

pub mod backend;
pub mod http;
pub mod memory;

pub use backend::{MediaStorage, MAX_IMAGES_PER_PRODUCT, MAX_IMAGE_BYTES};
pub use http::HttpMediaBackend;
pub use memory::MemoryMediaBackend;

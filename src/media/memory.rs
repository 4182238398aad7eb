//! In-memory media backend.
//!
//! Holds uploaded bytes in a map and hands back deterministic-looking
//! URLs.  Used by tests and the `memory` media configuration.

use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use super::backend::{namespaced_key, MediaStorage};

/// Media backend that keeps every upload in process memory.
#[derive(Default)]
pub struct MemoryMediaBackend {
    uploads: RwLock<HashMap<String, Bytes>>,
}

impl MemoryMediaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads received so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.read().expect("rwlock poisoned").len()
    }

    /// Fetch an upload's bytes back by the URL returned from `upload`.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.uploads.read().expect("rwlock poisoned").get(url).cloned()
    }
}

impl MediaStorage for MemoryMediaBackend {
    fn upload(
        &self,
        file_name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let key = namespaced_key("products", file_name);
        Box::pin(async move {
            let url = format!("https://media.local/{key}");
            self.uploads
                .write()
                .expect("rwlock poisoned")
                .insert(url.clone(), data);
            Ok(url)
        })
    }
}

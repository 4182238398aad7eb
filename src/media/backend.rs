//! Abstract media storage trait.
//!
//! Every media backend must implement [`MediaStorage`].  The contract
//! is a single streaming upload: callers hand over the raw image bytes
//! and receive the public URL the frontend should embed.

use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

/// Per-file upload ceiling (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum images accepted per product.
pub const MAX_IMAGES_PER_PRODUCT: usize = 4;

/// Async media upload contract.
pub trait MediaStorage: Send + Sync + 'static {
    /// Upload one image and return its public URL.
    ///
    /// `file_name` is the client-supplied name, used only to derive the
    /// stored key; `content_type` is the already-validated image MIME
    /// type.  Implementations namespace keys under their configured
    /// folder and must make the key unique per upload.
    fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;
}

/// Derive a namespaced, unique storage key for an upload.
///
/// Keeps the original file stem for operator readability and appends a
/// UUID so repeated uploads of the same file never collide, e.g.
/// `products/kettle_3f2a....jpg`.
pub fn namespaced_key(folder: &str, file_name: &str) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (file_name, "bin"),
    };
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{folder}/{stem}_{}.{ext}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key_shape() {
        let key = namespaced_key("products", "My Kettle.JPG");
        assert!(key.starts_with("products/my-kettle_"));
        assert!(key.ends_with(".JPG"));
    }

    #[test]
    fn test_namespaced_key_unique_per_upload() {
        let a = namespaced_key("products", "kettle.jpg");
        let b = namespaced_key("products", "kettle.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_namespaced_key_without_extension() {
        let key = namespaced_key("products", "kettle");
        assert!(key.starts_with("products/kettle_"));
        assert!(key.ends_with(".bin"));
    }
}

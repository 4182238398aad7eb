//! HTTP gateway media backend.
//!
//! Proxies uploads to an external media host over its JSON upload API
//! using `reqwest`.  The host stores the image and responds with the
//! public URL that gets embedded in product documents.
//!
//! Request shape: `POST {endpoint}/upload?name={key}` with the raw
//! image bytes as the body, the image MIME type as `Content-Type`, and
//! the API key as a bearer `Authorization` header.  Response shape:
//! `{"url": "https://..."}` on success, `{"error": {"message": ...}}`
//! otherwise.

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use super::backend::{namespaced_key, MediaStorage};

/// Coarse request timeout for uploads.
const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

/// Gateway backend that forwards uploads to the external media host.
pub struct HttpMediaBackend {
    /// HTTP client for upload calls.
    client: reqwest::Client,
    /// Upload endpoint base URL, no trailing slash.
    endpoint: String,
    /// API key sent with every request.
    api_key: String,
    /// Folder prefix for all stored keys.
    folder: String,
}

impl HttpMediaBackend {
    /// Create a new gateway backend for the given host.
    pub fn new(endpoint: String, api_key: String, folder: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {e}"))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            folder,
        })
    }
}

impl MediaStorage for HttpMediaBackend {
    fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let key = namespaced_key(&self.folder, file_name);
        let content_type = content_type.to_string();
        Box::pin(async move {
            let url = format!("{}/upload", self.endpoint);
            debug!("uploading {} bytes to media host as {}", data.len(), key);

            let response = self
                .client
                .post(&url)
                .query(&[("name", key.as_str())])
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                .header(CONTENT_TYPE, content_type)
                .body(data)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("media host unreachable: {e}"))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|e| e.error)
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "no detail".to_string());
                warn!("media host rejected upload of {key}: {status} ({detail})");
                return Err(anyhow::anyhow!("media host returned {status}: {detail}"));
            }

            let parsed: UploadResponse = response
                .json()
                .await
                .map_err(|e| anyhow::anyhow!("media host sent malformed response: {e}"))?;
            Ok(parsed.url)
        })
    }
}

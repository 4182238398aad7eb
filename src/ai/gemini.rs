//! Gemini text-generation client.
//!
//! Talks to the generative-language REST API via `reqwest`:
//! `POST {endpoint}/v1beta/models/{model}:generateContent?key={api_key}`
//! with a single-part content body, returning the first candidate's
//! text.  No retries; one failed call fails the request.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use super::model::TextModel;

/// Coarse request timeout for generation calls.
const GENERATE_TIMEOUT_SECS: u64 = 30;

// -- Wire types ---------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// -- Client -------------------------------------------------------------------

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    /// API base URL, no trailing slash.
    endpoint: String,
    api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`.
    model: String,
}

impl GeminiClient {
    pub fn new(endpoint: String, api_key: String, model: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(GENERATE_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {e}"))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }
}

impl TextModel for GeminiClient {
    fn generate(
        &self,
        prompt: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        Box::pin(async move {
            let url = format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint, self.model
            );
            debug!("requesting completion from {}", self.model);

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("generative endpoint unreachable: {e}"))?;

            let status = response.status();
            if !status.is_success() {
                warn!("generative endpoint returned {status}");
                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(anyhow::anyhow!("generative endpoint rate-limited"));
                }
                return Err(anyhow::anyhow!("generative endpoint returned {status}"));
            }

            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| anyhow::anyhow!("generative endpoint sent malformed response: {e}"))?;

            let text = parsed
                .candidates
                .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
                .and_then(|c| c.content)
                .and_then(|c| c.parts)
                .and_then(|mut p| if p.is_empty() { None } else { p.remove(0).text })
                .ok_or_else(|| anyhow::anyhow!("generative endpoint returned no candidates"))?;

            Ok(text.trim().to_string())
        })
    }
}

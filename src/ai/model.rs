//! Abstract text-generation trait.
//!
//! Any generative backend must implement [`TextModel`]: one prompt in,
//! one trimmed text completion out.  [`ScriptedModel`] is the test
//! double, replaying queued responses.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// Async text-generation contract.
pub trait TextModel: Send + Sync + 'static {
    /// Generate a completion for `prompt`.  Implementations return the
    /// response text already trimmed.
    fn generate(
        &self,
        prompt: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;
}

/// Test model that replays queued responses in order.
///
/// An empty queue makes `generate` fail, which doubles as the
/// "external endpoint down" fixture.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response for a future `generate` call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("mutex poisoned")
            .push_back(response.into());
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mutex poisoned").clone()
    }
}

impl TextModel for ScriptedModel {
    fn generate(
        &self,
        prompt: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            self.prompts.lock().expect("mutex poisoned").push(prompt);
            self.responses
                .lock()
                .expect("mutex poisoned")
                .pop_front()
                .map(|r| r.trim().to_string())
                .ok_or_else(|| anyhow::anyhow!("scripted model has no response queued"))
        })
    }
}

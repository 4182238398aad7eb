//! Generative-AI integration: model client plus the prompt/reply
//! composition used by the description generator and the chatbot.

pub mod assist;
pub mod gemini;
pub mod model;

pub use gemini::GeminiClient;
pub use model::{ScriptedModel, TextModel};

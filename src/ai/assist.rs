//! Prompt templates and chatbot orchestration.
//!
//! Two flows sit on top of the [`TextModel`] trait:
//!
//! - description generation: one templated copywriter prompt, response
//!   returned verbatim (trimmed);
//! - customer chat: keyword-triggered intent detection, model-assisted
//!   product-name extraction, a substring search over the catalogue,
//!   and a templated reply; anything else falls through to a general
//!   support prompt.

use crate::ai::model::TextModel;
use crate::store::{DocumentStore, ProductRecord};

/// Words that flag a message as a product enquiry.
const PRODUCT_KEYWORDS: &[&str] = &[
    "available", "have", "stock", "price", "product", "sell", "cost",
];

/// Sentinel the extraction prompt asks the model to return when no
/// product is mentioned.
const NO_PRODUCT_SENTINEL: &str = "none";

/// Most products listed in a single chat reply.
const MAX_CHAT_MATCHES: usize = 3;

/// Characters of the description quoted per product in a chat reply.
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Build the marketing-copy prompt for a product.
pub fn description_prompt(name: &str, category: &str) -> String {
    format!(
        "You are a professional e-commerce copywriter.\n\
         Write a concise product description (max 150 words) for:\n\
         - Name: {name}\n\
         - Category: {category}\n\
         Do NOT include price or stock. Make it friendly and appealing."
    )
}

/// Build the product-name extraction prompt for a customer message.
fn extraction_prompt(message: &str) -> String {
    format!(
        "Extract only the product name from this message.\n\
         If no product is mentioned, return \"{NO_PRODUCT_SENTINEL}\".\n\
         Message: \"{message}\""
    )
}

/// Build the general support-reply prompt for a customer message.
fn general_prompt(message: &str) -> String {
    format!(
        "You are a helpful support agent for an electronics shop.\n\
         Reply politely and briefly to:\n\
         \"{message}\""
    )
}

/// Whether the message contains any product-enquiry keyword.
fn is_product_query(message: &str) -> bool {
    let lowered = message.to_lowercase();
    PRODUCT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Compose the templated reply listing matched products.
fn compose_product_reply(products: &[ProductRecord]) -> String {
    let mut reply = format!("I found {} matching product(s):\n\n", products.len());
    for product in products {
        let preview: String = product
            .description
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();
        reply.push_str(&format!(
            "- **{}**\n   Price: LKR {}\n   Stock: {} units\n   {}...\n\n",
            product.name, product.price, product.stock, preview
        ));
    }
    reply.push_str("Would you like more details?");
    reply
}

/// Generate a marketing description for a product.
pub async fn generate_description(
    model: &dyn TextModel,
    name: &str,
    category: &str,
) -> anyhow::Result<String> {
    model.generate(&description_prompt(name, category)).await
}

/// Answer a free-text customer message.
///
/// A product enquiry first runs the extraction prompt and a catalogue
/// search; when matches exist the reply is composed locally without a
/// second model call.  Everything else is answered by the model's
/// general support reply.
pub async fn answer_customer(
    store: &dyn DocumentStore,
    model: &dyn TextModel,
    message: &str,
) -> anyhow::Result<String> {
    if is_product_query(message) {
        let extracted = model.generate(&extraction_prompt(message)).await?;
        let product_name = extracted.trim().trim_matches('"');

        if !product_name.eq_ignore_ascii_case(NO_PRODUCT_SENTINEL) && !product_name.is_empty() {
            let matches = store.search_products(product_name, MAX_CHAT_MATCHES).await?;
            if !matches.is_empty() {
                return Ok(compose_product_reply(&matches));
            }
        }
    }

    model.generate(&general_prompt(message)).await
}

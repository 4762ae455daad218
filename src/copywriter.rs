//! Ad copy generation via the Gemini `generateContent` API.
//!
//! One request per product, no retry. The response text is returned as-is;
//! turning it into captions is [`crate::reel::CaptionExtractor`]'s job.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::site::Product;

/// Default Gemini endpoint
pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Copy generation errors
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("no text found in Gemini response")]
    EmptyResponse,
}

/// Anything that can write ad copy for a product.
#[async_trait]
pub trait AdCopySource: Send + Sync {
    async fn generate(&self, product: &Product) -> Result<String, GenerationError>;
}

/// Gemini-backed copywriter
pub struct Copywriter {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl Copywriter {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl AdCopySource for Copywriter {
    #[instrument(skip(self, product), fields(title = ?product.title))]
    async fn generate(&self, product: &Product) -> Result<String, GenerationError> {
        let key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": build_prompt(product) }] }
            ]
        });

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let payload: serde_json::Value = response.json().await?;
        let text = candidate_text(&payload).ok_or(GenerationError::EmptyResponse)?;
        debug!(chars = text.len(), "Ad copy generated");
        Ok(text)
    }
}

/// First candidate's text, if any.
fn candidate_text(payload: &serde_json::Value) -> Option<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Marketing prompt asking for a five-scene, 15 second script.
#[must_use]
pub fn build_prompt(product: &Product) -> String {
    let title = product.title.as_deref().unwrap_or("Untitled product");
    let price = product.price.as_deref().unwrap_or("Not specified");
    let features = if product.features.is_empty() {
        "N/A".to_string()
    } else {
        product.features.join("\n")
    };
    let description = product.description.as_deref().unwrap_or("");

    format!(
        "As a professional marketing copywriter, create compelling ad content for this product:
    Product: {title}
    Price: {price}
    Key Features:
    {features}

    Description: {description}

    Please generate a 15-second video script with EXACTLY this format:

    **Scene 1: 0-3 seconds**:
    **Voiceover**: [Opening hook about main benefit]

    **Scene 2: 3-6 seconds**:
    **Voiceover**: [Highlight key feature 1]

    **Scene 3: 6-9 seconds**:
    **Voiceover**: [Highlight key feature 2]

    **Scene 4: 9-12 seconds**:
    **Voiceover**: [Social proof or unique selling point]

    **Scene 5: 12-15 seconds**:
    **Voiceover**: [Strong CTA with urgency]

    Also provide:
    1. A 30-word social media ad (focus on top 3 benefits)
    2. A 100-word product highlight (for email marketing)

    Use emotional triggers and strong CTAs. Target audience: online shoppers aged 18-45."
    )
}

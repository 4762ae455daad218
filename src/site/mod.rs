//! Product page extraction.
//!
//! # Architecture
//!
//! - [`ProductProvider`]: per-platform selector logic over parsed HTML
//! - [`ProductRouter`]: fetches a page and dispatches to the first provider that matches
//! - [`Product`]: the scraped listing
//!
//! Amazon is recognised by URL; Shopify storefronts by markers in the page.
//! Anything else is rejected before any generation work happens.
//!
//! # Example
//!
//! ```rust,no_run
//! use adreel::site::ProductRouter;
//! use adreel::AcceleratedClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = AcceleratedClient::new()?;
//! let product = ProductRouter::new().scrape("https://www.amazon.in/dp/B0EXAMPLE", &client).await?;
//! println!("{:?}", product.title);
//! # Ok(())
//! # }
//! ```

pub mod amazon;
pub mod shopify;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::http_client::{AcceleratedClient, RetryPolicy};

/// Scraping errors
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("unsupported website: {0}")]
    UnsupportedSource(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page loading failed after {attempts} attempts: {reason}")]
    Fetch { attempts: u32, reason: String },

    #[error("failed to extract product data from page: missing {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// A scraped product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub platform: String,
    pub source_url: String,
    pub title: Option<String>,
    pub price: Option<String>,
    /// Absolute image URLs, de-duplicated, page order
    pub images: Vec<String>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Selector logic for one storefront family.
pub trait ProductProvider: Send + Sync {
    /// Provider name (e.g., "amazon", "shopify").
    fn name(&self) -> &'static str;

    /// Check if this provider handles the page.
    fn matches(&self, url: &Url, doc: &Html) -> bool;

    /// Extract the product from a parsed page.
    fn extract(&self, url: &Url, doc: &Html) -> Result<Product>;
}

/// Routes pages to product providers.
///
/// Providers are checked in registration order. First match wins.
pub struct ProductRouter {
    providers: Vec<Box<dyn ProductProvider>>,
    retry: RetryPolicy,
}

impl ProductRouter {
    /// Create a router with all available providers.
    #[must_use]
    pub fn new() -> Self {
        let providers: Vec<Box<dyn ProductProvider>> = vec![
            Box::new(amazon::AmazonProvider),
            Box::new(shopify::ShopifyProvider),
        ];

        Self {
            providers,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the page fetch retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch `url` (with retries) and extract the product.
    pub async fn scrape(&self, url: &str, client: &AcceleratedClient) -> Result<Product> {
        let parsed = parse_url(url)?;
        let html = client
            .fetch_text_with_retry(parsed.as_str(), self.retry)
            .await
            .map_err(|e| ScrapeError::Fetch {
                attempts: self.retry.attempts,
                reason: format!("{e:#}"),
            })?;
        self.extract_html(url, &html)
    }

    /// Extract from already-fetched HTML.
    pub fn extract_html(&self, url: &str, html: &str) -> Result<Product> {
        let parsed = parse_url(url)?;
        let doc = Html::parse_document(html);

        let provider = self
            .providers
            .iter()
            .find(|p| p.matches(&parsed, &doc))
            .ok_or_else(|| ScrapeError::UnsupportedSource(url.to_string()))?;

        tracing::debug!("Matched product provider: {}", provider.name());
        provider.extract(&parsed, &doc)
    }
}

impl Default for ProductRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text of an element: whitespace collapsed per line, blank lines dropped.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the first element matching any selector, tried in order.
pub(crate) fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        doc.select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// Non-empty texts of all elements matching `css`.
pub(crate) fn all_texts(doc: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// True if anything matches `css`.
pub(crate) fn has_match(doc: &Html, css: &str) -> bool {
    Selector::parse(css).is_ok_and(|selector| doc.select(&selector).next().is_some())
}

/// Resolve an image reference against the page; inline `data:` images are skipped.
pub(crate) fn resolve_image(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }
    base.join(raw).ok().map(String::from)
}

/// Order-preserving de-duplication.
pub(crate) fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

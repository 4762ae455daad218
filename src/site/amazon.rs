//! Amazon product pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{all_texts, dedup, first_text, resolve_image, Product, ProductProvider, Result, ScrapeError};

const MAX_FEATURES: usize = 10;

/// Amazon's size/crop token in image file names, e.g. `._AC_SX300_SY300_.`
static SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\._.*?_\.").expect("valid regex"));

const IMAGE_SELECTOR: &str =
    "#imgTagWrapperId img, #landingImage, [data-a-image-name=\"landingImage\"], .imgTagWrapper img";

/// Image attributes, most preferred first.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-old-hires", "data-a-dynamic-image"];

/// Amazon listing provider.
pub struct AmazonProvider;

impl ProductProvider for AmazonProvider {
    fn name(&self) -> &'static str {
        "amazon"
    }

    fn matches(&self, url: &Url, _doc: &Html) -> bool {
        url.as_str().contains("amazon.")
    }

    fn extract(&self, url: &Url, doc: &Html) -> Result<Product> {
        let title = first_text(doc, &["#productTitle", "#title", "h1"])
            .ok_or(ScrapeError::MissingField("title"))?;

        let price = first_text(doc, &[".a-price .a-offscreen", ".priceToPay span", ".a-price-whole"]);

        let description = first_text(
            doc,
            &["#productDescription", "#feature-bullets", "#productOverview", "#description"],
        );

        let features: Vec<String> = all_texts(doc, "#feature-bullets li, .a-unordered-list li")
            .into_iter()
            .take(MAX_FEATURES)
            .collect();

        Ok(Product {
            platform: "amazon".to_string(),
            source_url: url.to_string(),
            title: Some(title),
            price,
            images: extract_images(url, doc),
            description,
            features,
        })
    }
}

fn extract_images(url: &Url, doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(IMAGE_SELECTOR) else {
        return Vec::new();
    };

    let images = doc
        .select(&selector)
        .filter_map(|img| {
            IMAGE_ATTRS
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .find(|value| !value.trim().is_empty())
        })
        .filter_map(|raw| resolve_image(url, &dynamic_image_url(raw)))
        .map(|src| high_resolution(&src))
        .collect();

    dedup(images)
}

/// `data-a-dynamic-image` holds a JSON map of URL to dimensions; take the first URL.
fn dynamic_image_url(raw: &str) -> String {
    if raw.trim_start().starts_with('{') {
        if let Ok(map) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            if let Some(first) = map.keys().next() {
                return first.clone();
            }
        }
    }
    raw.to_string()
}

/// Rewrite the first size token to request the 1500px rendition.
fn high_resolution(src: &str) -> String {
    SIZE_TOKEN.replace(src, "._AC_SL1500_.").into_owned()
}

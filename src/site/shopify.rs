//! Shopify storefront product pages.

use scraper::{Html, Selector};
use url::Url;

use super::{all_texts, dedup, first_text, has_match, resolve_image, Product, ProductProvider, Result};

/// Shopify storefront provider, detected from page markers.
pub struct ShopifyProvider;

impl ProductProvider for ShopifyProvider {
    fn name(&self) -> &'static str {
        "shopify"
    }

    fn matches(&self, _url: &Url, doc: &Html) -> bool {
        has_match(doc, "meta[name=\"generator\"][content*=\"Shopify\"]")
            || has_match(doc, "link[href*=\"shopify\"]")
    }

    fn extract(&self, url: &Url, doc: &Html) -> Result<Product> {
        let title = first_text(doc, &[".product__title", ".product-title"]);
        let price = first_text(
            doc,
            &[".price__regular .price-item--regular", ".product-price"],
        );
        let description = first_text(doc, &[".product__description", ".product-single__description"]);
        let features = all_texts(
            doc,
            ".product__accordion .accordion__content li, .product-tabs__content li",
        );

        Ok(Product {
            platform: "shopify".to_string(),
            source_url: url.to_string(),
            title,
            price,
            images: extract_images(url, doc),
            description,
            features,
        })
    }
}

fn extract_images(url: &Url, doc: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(".product__media img, .product-single__media img") else {
        return Vec::new();
    };

    let images = doc
        .select(&selector)
        .filter_map(|img| {
            let value = img.value();
            value
                .attr("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| value.attr("data-src"))
        })
        .filter_map(|raw| resolve_image(url, raw))
        // Drop Shopify's resize/version query so identical images collapse
        .map(|src| src.split('?').next().unwrap_or(&src).to_string())
        .collect();

    dedup(images)
}

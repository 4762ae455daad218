//! End-to-end ad job: scrape a product page, optionally write copy and render
//! a captioned video from the first product image.
//!
//! Only the scrape is fatal. Everything after it is best effort: a failure
//! while generating copy or rendering is recorded on the report and the
//! scraped product is still returned.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::copywriter::AdCopySource;
use crate::http_client::AcceleratedClient;
use crate::reel::{CaptionExtractor, CaptionSource, ProgressCallback, ReelConfig, Renderer, VideoArtifact};
use crate::site::{Product, ProductRouter, Result};

/// Outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_copy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_error: Option<String>,
}

impl JobReport {
    fn scraped(product: Product) -> Self {
        Self {
            product,
            ad_copy: None,
            video: None,
            generation_error: None,
        }
    }
}

/// Wires scraper, copywriter and renderer together.
pub struct AdJob {
    client: AcceleratedClient,
    router: ProductRouter,
    copywriter: Box<dyn AdCopySource>,
    renderer: Renderer,
    extractor: CaptionExtractor,
}

impl AdJob {
    pub fn new(
        client: AcceleratedClient,
        router: ProductRouter,
        copywriter: Box<dyn AdCopySource>,
        renderer: Renderer,
        config: &ReelConfig,
    ) -> Self {
        Self {
            client,
            router,
            copywriter,
            renderer,
            extractor: CaptionExtractor::new(config),
        }
    }

    /// Fetch `url` and run the job.
    ///
    /// # Errors
    ///
    /// Fails only if the page cannot be fetched or no provider can read it.
    #[instrument(skip(self, progress))]
    pub async fn run(&self, url: &str, generate_ad: bool, progress: Option<ProgressCallback>) -> Result<JobReport> {
        let product = self.router.scrape(url, &self.client).await?;
        Ok(self.finish(product, generate_ad, progress).await)
    }

    /// Run the job against HTML that was already fetched.
    pub async fn run_with_html(
        &self,
        url: &str,
        html: &str,
        generate_ad: bool,
        progress: Option<ProgressCallback>,
    ) -> Result<JobReport> {
        let product = self.router.extract_html(url, html)?;
        Ok(self.finish(product, generate_ad, progress).await)
    }

    async fn finish(&self, product: Product, generate_ad: bool, progress: Option<ProgressCallback>) -> JobReport {
        info!(title = ?product.title, images = product.images.len(), "Product scraped");
        let mut report = JobReport::scraped(product);
        if generate_ad {
            if let Err(e) = self.generate(&mut report, progress).await {
                warn!("Generation error: {}", e);
                report.generation_error = Some(e);
            }
        }
        report
    }

    async fn generate(&self, report: &mut JobReport, progress: Option<ProgressCallback>) -> std::result::Result<(), String> {
        let copy = self
            .copywriter
            .generate(&report.product)
            .await
            .map_err(|e| e.to_string())?;
        let copy = report.ad_copy.insert(copy);

        let image = report
            .product
            .images
            .first()
            .ok_or_else(|| "product has no images to render".to_string())?;

        let title = report.product.title.as_deref().filter(|t| !t.trim().is_empty());
        let extraction = self.extractor.extract_detailed(copy, title);
        match extraction.source {
            CaptionSource::Structured(tier) => info!(tier, cues = extraction.cues.len(), "Captions extracted"),
            other => warn!(source = ?other, cues = extraction.cues.len(), "Captions degraded"),
        }

        let video = self
            .renderer
            .render(image, &extraction.cues, progress)
            .await
            .map_err(|e| e.to_string())?;
        report.video = Some(video);
        Ok(())
    }
}

//! `adreel` - Product pages to captioned vertical video ads
//!
//! # Features
//!
//! - **Scraping**: Amazon and Shopify product pages over a browser-like HTTP client
//! - **Copywriting**: Five-scene ad scripts from the Gemini API
//! - **Captions**: Timed cues recovered from loosely formatted ad copy
//! - **Rendering**: Layout, fades and a single ffmpeg filter graph per video
//!
//! # Example
//!
//! ```rust
//! use adreel::reel::{CaptionExtractor, FilterChainBuilder, ReelConfig};
//!
//! let config = ReelConfig::default();
//! let cues = CaptionExtractor::new(&config)
//!     .extract("**Scene 1: 0-3 seconds**\n**Voiceover:** Meet your new favourite mug");
//! let program = FilterChainBuilder::new(&config).build(&cues);
//! assert_eq!(program.len(), 3);
//! ```

pub mod config;
pub mod copywriter;
pub mod fingerprint;
pub mod http_client;
pub mod job;
pub mod reel;
pub mod site;

pub use config::Settings;
pub use copywriter::{AdCopySource, Copywriter, GenerationError};
pub use fingerprint::{chrome_profile, firefox_profile, random_profile, BrowserProfile};
pub use http_client::{AcceleratedClient, RetryPolicy};
pub use job::{AdJob, JobReport};
pub use reel::{ReelConfig, ReelError, Renderer, VideoArtifact};
pub use site::{Product, ProductRouter, ScrapeError};

/// Version of adreel
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! `adreel` CLI - Product pages to captioned vertical video ads

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cmd::{cmd_captions, cmd_filter, cmd_render, cmd_scrape};

#[derive(Parser)]
#[command(name = "adreel")]
#[command(about = "Turn product pages into captioned vertical video ads")]
#[command(version = adreel::VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract timed captions from ad copy
    Captions {
        /// Ad copy file ("-" for stdin)
        input: String,

        /// Print cues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the ffmpeg filter program for ad copy
    Filter {
        /// Ad copy file ("-" for stdin)
        input: String,
    },

    /// Render a captioned video over an image
    Render {
        /// Source image URL
        #[arg(long)]
        image: String,

        /// Ad copy file ("-" for stdin)
        #[arg(long)]
        text: String,

        /// Where to write the video (default from config, else ./videos)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Scrape a product page, optionally generating an ad video
    Scrape {
        /// Product page URL (Amazon or Shopify)
        url: String,

        /// Write ad copy with Gemini and render a video
        #[arg(short, long)]
        generate_ad: bool,

        /// Where to write the video (default from config, else ./videos)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Captions { input, json } => {
            cmd_captions(&input, json)?;
        }
        Commands::Filter { input } => {
            cmd_filter(&input)?;
        }
        Commands::Render { image, text, output_dir } => {
            cmd_render(&image, &text, output_dir).await?;
        }
        Commands::Scrape { url, generate_ad, output_dir } => {
            cmd_scrape(&url, generate_ad, output_dir).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for JSON. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "adreel=debug" } else { "adreel=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

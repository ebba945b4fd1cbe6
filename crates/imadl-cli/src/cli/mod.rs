//! CLI for the imadl knowledge-base downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imadl_core::config;
use std::path::{Path, PathBuf};

use commands::{run_crawl, run_cursor, CrawlOverrides, TemplateSource};

/// Top-level CLI for imadl.
#[derive(Debug, Parser)]
#[command(name = "imadl")]
#[command(about = "imadl: download every file listed in a shared knowledge base", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Walk the listing page by page and download every item.
    ///
    /// Without --request or --har the captured listing request is read from stdin.
    Crawl {
        /// File holding the raw captured listing request (request line, headers, blank line, JSON body).
        #[arg(long, value_name = "FILE", conflicts_with = "har")]
        request: Option<PathBuf>,

        /// Browser HAR export containing the listing request.
        #[arg(long, value_name = "FILE")]
        har: Option<PathBuf>,

        /// Directory to save files into (overrides config).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Items requested per page (overrides config).
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        page_size: Option<u32>,

        /// Pause between pages in milliseconds (overrides config).
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
    },

    /// Print the cursor token the listing API expects for an item offset.
    Cursor {
        /// Number of items already listed.
        offset: u64,
    },
}

impl CliCommand {
    /// Returns Ok(false) when the run finished but something failed along the way.
    pub fn run_from_args(log_path: Option<&Path>) -> Result<bool> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Crawl {
                request,
                har,
                download_dir,
                page_size,
                delay_ms,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let source = match (request, har) {
                    (Some(path), _) => TemplateSource::RawFile(path),
                    (None, Some(path)) => TemplateSource::Har(path),
                    (None, None) => TemplateSource::Stdin,
                };
                let overrides = CrawlOverrides {
                    download_dir,
                    page_size,
                    delay_ms,
                };
                run_crawl(&cfg, &source, &overrides, log_path)
            }
            CliCommand::Cursor { offset } => {
                run_cursor(offset);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests;

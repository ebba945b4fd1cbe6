//! `imadl crawl` – capture the listing request, then download every listed item.

use anyhow::{Context, Result};
use imadl_core::config::ImadlConfig;
use imadl_core::crawl::{self, CrawlEvent, CrawlOptions, CrawlSummary, CurlApi, Termination};
use imadl_core::template::{self, RequestTemplate};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the listing request template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Stdin,
    RawFile(PathBuf),
    Har(PathBuf),
}

/// Per-run flags that take precedence over config.toml.
#[derive(Debug, Clone, Default)]
pub struct CrawlOverrides {
    pub download_dir: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub delay_ms: Option<u64>,
}

pub fn run_crawl(
    cfg: &ImadlConfig,
    source: &TemplateSource,
    overrides: &CrawlOverrides,
    log_path: Option<&Path>,
) -> Result<bool> {
    println!("=== imadl: knowledge base downloader ===");
    println!();

    let template = load_template(source, &cfg.base_url)?;
    println!("✓ parsed {} header field(s)", template.headers.len());
    println!("✓ URL: {}", template.url);
    println!("✓ Body: {}\n", template.body_json());
    tracing::info!(url = %template.url, headers = template.headers.len(), "request template loaded");

    let opts = crawl_options(cfg, overrides);
    std::fs::create_dir_all(&opts.download_dir).with_context(|| {
        format!(
            "create download directory: {}",
            opts.download_dir.display()
        )
    })?;

    let api = CurlApi::new(template, cfg.media_url.clone(), cfg.http());
    let summary = crawl::run_crawl(&api, &opts, |event| {
        if let Some(line) = render_event(event) {
            println!("{line}");
        }
    });

    print_summary(&summary, log_path);
    Ok(summary.is_clean())
}

fn load_template(source: &TemplateSource, base_url: &str) -> Result<RequestTemplate> {
    match source {
        TemplateSource::Stdin => {
            println!("Paste the captured listing request (headers and body), then enter two empty lines:");
            println!();
            let text = template::read_raw_request(io::stdin().lock())?;
            template::parse_raw_request(&text, base_url).context("parse captured request")
        }
        TemplateSource::RawFile(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read request file: {}", path.display()))?;
            template::parse_raw_request(&text, base_url)
                .with_context(|| format!("parse request file: {}", path.display()))
        }
        TemplateSource::Har(path) => template::from_har(path),
    }
}

pub(crate) fn crawl_options(cfg: &ImadlConfig, overrides: &CrawlOverrides) -> CrawlOptions {
    CrawlOptions {
        download_dir: overrides
            .download_dir
            .clone()
            .unwrap_or_else(|| cfg.download_dir.clone()),
        page_size: overrides.page_size.unwrap_or(cfg.page_size),
        page_delay: overrides
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| cfg.page_delay()),
    }
}

/// Console line for a crawl event, if it gets one.
pub(crate) fn render_event(event: &CrawlEvent<'_>) -> Option<String> {
    match event {
        CrawlEvent::PageRequested { page, offset } => {
            Some(format!("\nFetching page {page} (from offset {offset})..."))
        }
        CrawlEvent::PageFetched {
            items, total_size, ..
        } => {
            let total = if total_size.is_empty() { "?" } else { *total_size };
            Some(format!("Got {items} item(s) ({total} in total)\n"))
        }
        CrawlEvent::ItemStarted { index, item } => Some(format!("[{index}] {}", item.title)),
        CrawlEvent::ItemSaved { path, .. } => Some(format!("  ✓ saved: {}", path.display())),
        CrawlEvent::ItemFailed { stage, error, .. } => {
            Some(format!("  ✗ failed to {stage}: {error}"))
        }
    }
}

pub(crate) fn render_termination(termination: &Termination) -> String {
    match termination {
        Termination::EmptyPage => "No items on this page; download complete.".to_string(),
        Termination::EndOfListing => "\nReached the last page.".to_string(),
        Termination::FetchFailed { page, error } => {
            format!("\nFailed to fetch page {page}: {error}\nStopping; nothing after this page was attempted.")
        }
    }
}

fn print_summary(summary: &CrawlSummary, log_path: Option<&Path>) {
    println!("{}", render_termination(&summary.termination));
    println!("\n========== done ==========");
    println!("pages:      {}", summary.pages);
    println!("attempted:  {}", summary.attempted);
    println!("succeeded:  {}", summary.succeeded);
    println!("failed:     {}", summary.failed);
    if let Some(path) = log_path {
        println!("details in: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imadl_core::listing::ListingItem;
    use imadl_core::CrawlError;

    #[test]
    fn overrides_take_precedence() {
        let cfg = ImadlConfig::default();
        let opts = crawl_options(
            &cfg,
            &CrawlOverrides {
                download_dir: Some(PathBuf::from("/tmp/kb")),
                page_size: Some(50),
                delay_ms: Some(0),
            },
        );
        assert_eq!(opts.download_dir, PathBuf::from("/tmp/kb"));
        assert_eq!(opts.page_size, 50);
        assert_eq!(opts.page_delay, Duration::ZERO);
    }

    #[test]
    fn config_used_without_overrides() {
        let cfg = ImadlConfig::default();
        let opts = crawl_options(&cfg, &CrawlOverrides::default());
        assert_eq!(opts.download_dir, PathBuf::from("downloads"));
        assert_eq!(opts.page_size, 20);
        assert_eq!(opts.page_delay, Duration::from_millis(500));
    }

    #[test]
    fn renders_item_lines() {
        let item = ListingItem {
            title: "report.pdf".to_string(),
            parent_folder_id: "kb1".to_string(),
            media_id: "m1".to_string(),
        };
        assert_eq!(
            render_event(&CrawlEvent::ItemStarted { index: 21, item: &item }).as_deref(),
            Some("[21] report.pdf")
        );
        let err = CrawlError::HttpStatus { code: 403 };
        assert_eq!(
            render_event(&CrawlEvent::ItemFailed {
                index: 21,
                stage: imadl_core::crawl::ItemStage::Download,
                error: &err,
            })
            .as_deref(),
            Some("  ✗ failed to download: HTTP 403")
        );
        assert_eq!(
            render_event(&CrawlEvent::PageFetched {
                page: 1,
                items: 20,
                total_size: "",
            })
            .as_deref(),
            Some("Got 20 item(s) (? in total)\n")
        );
    }

    #[test]
    fn renders_fetch_failure() {
        let line = render_termination(&Termination::FetchFailed {
            page: 3,
            error: CrawlError::Remote {
                code: 10001,
                message: "login expired".to_string(),
            },
        });
        assert!(line.contains("page 3"));
        assert!(line.contains("code=10001"));
    }

    #[test]
    fn reads_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.txt");
        std::fs::write(
            &path,
            "POST /cgi-bin/list HTTP/1.1\nCookie: a=b\n\n{\"cursor\":\"\",\"limit\":20}\n",
        )
        .unwrap();
        let t = load_template(&TemplateSource::RawFile(path), "https://ima.qq.com").unwrap();
        assert_eq!(t.url, "https://ima.qq.com/cgi-bin/list");
        assert_eq!(t.headers["Cookie"], "a=b");
    }
}

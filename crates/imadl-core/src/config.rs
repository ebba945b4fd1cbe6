use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default listing host; relative request-line targets are joined onto it.
pub const DEFAULT_BASE_URL: &str = "https://ima.qq.com";

/// Endpoint that turns a (knowledge base, media) pair into a short-lived download link.
pub const DEFAULT_MEDIA_URL: &str = "https://ima.qq.com/cgi-bin/file_manager/get_media";

/// Timeouts for libcurl handles (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for listing and media calls.
    pub request_timeout_secs: u64,
    /// Whole-request timeout for a single file download.
    pub download_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            download_timeout_secs: 3600,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/imadl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImadlConfig {
    /// Directory downloaded files are written to (relative paths resolve against the cwd).
    pub download_dir: PathBuf,
    /// Items requested per listing page.
    pub page_size: u32,
    /// Pause between listing pages, in milliseconds.
    pub page_delay_ms: u64,
    /// Origin used when the captured request line only carries a path.
    pub base_url: String,
    /// Media resolution endpoint.
    pub media_url: String,
    /// Optional timeouts; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for ImadlConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            page_size: 20,
            page_delay_ms: 500,
            base_url: DEFAULT_BASE_URL.to_string(),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            http: None,
        }
    }
}

impl ImadlConfig {
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Rejects values the crawler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imadl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImadlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImadlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ImadlConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

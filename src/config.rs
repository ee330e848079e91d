//! Configuration parsing and validation.
//!
//! doc-mirror is configured via a TOML file (default `./config/docmirror.toml`).
//! Every section except `[db]` and `[mirror]` is optional and falls back to
//! the defaults below.
//!
//! ```toml
//! [db]
//! path = "./data/docmirror.sqlite"
//!
//! [mirror]
//! output_dir = "./mirror"
//! min_content_length = 10
//!
//! [fetch]
//! max_attempts = 3
//! retry_delay_ms = 2000
//! page_delay_ms = 1000
//! cache_write_attempts = 2
//!
//! [source]
//! api_base = "https://coda.io/apis/v1"
//! token_env = "DOC_API_TOKEN"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MirrorConfig {
    /// Directory holding one markdown file per mirrored page.
    pub output_dir: PathBuf,
    /// Pages whose trimmed content is shorter than this are skipped.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
}

fn default_min_content_length() -> usize {
    10
}

/// Retry and pacing knobs for talking to the page source.
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Total content fetch attempts per page, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed wait between failed attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Fixed wait between consecutive pages.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Attempts at the cache upsert after the mirror file is written.
    #[serde(default = "default_cache_write_attempts")]
    pub cache_write_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            page_delay_ms: default_page_delay_ms(),
            cache_write_attempts: default_cache_write_attempts(),
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_page_delay_ms() -> u64 {
    1000
}
fn default_cache_write_attempts() -> u32 {
    2
}

/// Connection settings for the remote document API.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Name of the environment variable holding the API bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Page listing batch size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_export_poll_ms")]
    pub export_poll_ms: u64,
    #[serde(default = "default_export_max_polls")]
    pub export_max_polls: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            export_poll_ms: default_export_poll_ms(),
            export_max_polls: default_export_max_polls(),
        }
    }
}

fn default_api_base() -> String {
    "https://coda.io/apis/v1".to_string()
}
fn default_token_env() -> String {
    "DOC_API_TOKEN".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_size() -> u32 {
    100
}
fn default_export_poll_ms() -> u64 {
    1000
}
fn default_export_max_polls() -> u32 {
    30
}

impl Config {
    /// Config rooted at `dir`, with every optional section at its default.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            db: DbConfig {
                path: dir.join("docmirror.sqlite"),
            },
            mirror: MirrorConfig {
                output_dir: dir.join("mirror"),
                min_content_length: default_min_content_length(),
            },
            fetch: FetchConfig::default(),
            source: SourceConfig::default(),
        }
    }

    /// Check the invariants `load_config` enforces after parsing.
    pub fn validate(&self) -> Result<()> {
        if self.mirror.output_dir.as_os_str().is_empty() {
            anyhow::bail!("mirror.output_dir must not be empty");
        }
        if self.fetch.max_attempts == 0 {
            anyhow::bail!("fetch.max_attempts must be >= 1");
        }
        if self.fetch.cache_write_attempts == 0 {
            anyhow::bail!("fetch.cache_write_attempts must be >= 1");
        }
        if self.source.timeout_secs == 0 {
            anyhow::bail!("source.timeout_secs must be > 0");
        }
        if self.source.page_size == 0 {
            anyhow::bail!("source.page_size must be > 0");
        }
        if self.source.export_max_polls == 0 {
            anyhow::bail!("source.export_max_polls must be >= 1");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

//! TOML configuration parsing and validation.
//!
//! Every section and key has a default, so an empty file (or no file at the
//! default location) yields a working configuration that targets the public
//! `api.magicthegathering.io` card endpoint.
//!
//! ```toml
//! [api]
//! base_url = "https://api.magicthegathering.io/v1"
//! resource = "cards"
//! page_size = 100
//! # max_pages = 10
//! timeout_secs = 30
//! user_agent = "mtg-sampler"
//!
//! [dataset]
//! path = "./data/mtg_dataset.json"
//!
//! [sample]
//! size = 1000
//! seed = 42
//! require_field = "multiverseid"
//! dedup = true
//! dedup_field = "name"
//! max_attempts = 10000000
//! path = "./data/mtg_sample.json"
//! ```

use anyhow::{Context, Result};
use mtg_sampler_core::sampler::DEFAULT_MAX_ATTEMPTS;
use mtg_sampler_core::SampleSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file location used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/mtgs.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub sample: SampleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Collection name; also the JSON key holding each page's records.
    #[serde(default = "default_resource")]
    pub resource: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource: default_resource(),
            page_size: default_page_size(),
            max_pages: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.magicthegathering.io/v1".to_string()
}
fn default_resource() -> String {
    "cards".to_string()
}
fn default_page_size() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("mtg-sampler/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("./data/mtg_dataset.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SampleConfig {
    #[serde(default = "default_sample_size")]
    pub size: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_require_field")]
    pub require_field: String,
    #[serde(default = "default_dedup")]
    pub dedup: bool,
    #[serde(default = "default_dedup_field")]
    pub dedup_field: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,
    #[serde(default = "default_sample_path")]
    pub path: PathBuf,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            size: default_sample_size(),
            seed: default_seed(),
            require_field: default_require_field(),
            dedup: default_dedup(),
            dedup_field: default_dedup_field(),
            max_attempts: default_max_attempts(),
            path: default_sample_path(),
        }
    }
}

fn default_sample_size() -> usize {
    1000
}
fn default_seed() -> u64 {
    42
}
fn default_require_field() -> String {
    "multiverseid".to_string()
}
fn default_dedup() -> bool {
    true
}
fn default_dedup_field() -> String {
    "name".to_string()
}
fn default_max_attempts() -> u64 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_sample_path() -> PathBuf {
    PathBuf::from("./data/mtg_sample.json")
}

impl SampleConfig {
    /// Build the sampler spec described by this section.
    pub fn to_spec(&self) -> SampleSpec {
        let spec = SampleSpec::new(self.size, self.require_field.clone())
            .with_max_attempts(self.max_attempts);
        if self.dedup {
            spec.with_dedup(self.dedup_field.clone())
        } else {
            spec
        }
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse, and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load the config given on the command line, or the one at
/// [`DEFAULT_CONFIG_PATH`] when none was given.
///
/// Only a missing file at the default location falls back to
/// [`Config::default`]; an explicit path must exist.
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    let api = &config.api;
    if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
        anyhow::bail!("api.base_url must start with http:// or https://");
    }
    if api.resource.is_empty() {
        anyhow::bail!("api.resource must not be empty");
    }
    if !(1..=100).contains(&api.page_size) {
        anyhow::bail!("api.page_size must be in [1, 100]");
    }
    if api.max_pages == Some(0) {
        anyhow::bail!("api.max_pages must be >= 1 when set");
    }
    if api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    let sample = &config.sample;
    if sample.require_field.is_empty() {
        anyhow::bail!("sample.require_field must not be empty");
    }
    if sample.dedup && sample.dedup_field.is_empty() {
        anyhow::bail!("sample.dedup_field must not be empty when sample.dedup = true");
    }
    if sample.max_attempts == 0 {
        anyhow::bail!("sample.max_attempts must be > 0");
    }

    Ok(())
}

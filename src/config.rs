//! Runtime configuration.
//!
//! A [`Config`] is assembled once at startup from three layers (built-in
//! defaults, an optional YAML file, then command-line/environment overrides)
//! and handed by value to each component. Nothing reads configuration from
//! ambient process state after that.
//!
//! # YAML file
//!
//! Every key is optional:
//!
//! ```yaml
//! data_dir: /var/lib/onthisday
//! source: api              # html | api
//! layout: per-category     # per-day | per-category
//! categories: [events, births]
//! timeout_secs: 5
//! request_delay_ms: 100
//! retries: 2
//! strict: false
//! ```

use crate::error::{OnThisDayError, Result};
use crate::models::Category;
use crate::utils::default_data_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ARTICLE_BASE_URL: &str = "https://en.wikipedia.org/wiki/";
pub const DEFAULT_API_BASE_URL: &str =
    "https://api.wikimedia.org/feed/v1/wikipedia/en/onthisday/all/";

/// Which remote source variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scrape the wiki day article.
    Html,
    /// Query the REST on-this-day feed.
    Api,
}

impl SourceKind {
    /// Categories each variant can actually produce.
    pub fn default_categories(&self) -> Vec<Category> {
        match self {
            SourceKind::Html => vec![Category::Events, Category::Births, Category::Deaths],
            SourceKind::Api => Category::ALL.to_vec(),
        }
    }
}

/// How cache entries are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One file per date holding every category.
    PerDay,
    /// One file per date and category.
    PerCategory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub source: SourceKind,
    pub article_base_url: String,
    pub api_base_url: String,
    pub user_agent: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Pause between consecutive fetches during a bulk download.
    pub request_delay: Duration,
    /// Extra attempts after a `SourceUnavailable` failure.
    pub retries: usize,
    pub retry_base_delay: Duration,
    pub categories: Vec<Category>,
    pub layout: Layout,
    /// Abort a bulk download on the first failing day.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        let source = SourceKind::Html;
        Self {
            data_dir: default_data_dir(),
            source,
            article_base_url: DEFAULT_ARTICLE_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: format!(
                "{}/{} (on-this-day cache)",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            timeout: Duration::from_secs(5),
            request_delay: Duration::from_millis(100),
            retries: 2,
            retry_base_delay: Duration::from_millis(500),
            categories: source.default_categories(),
            layout: Layout::PerDay,
            strict: false,
        }
    }
}

/// Shape of the optional YAML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub source: Option<SourceKind>,
    pub article_base_url: Option<String>,
    pub api_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub retries: Option<usize>,
    pub retry_base_delay_ms: Option<u64>,
    pub categories: Option<Vec<String>>,
    pub layout: Option<Layout>,
    pub strict: Option<bool>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| OnThisDayError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| OnThisDayError::io(path, e))?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_yaml(&text)
    }
}

impl Config {
    /// Defaults overlaid with the values present in `file`.
    ///
    /// When the file picks a source but no categories, the categories follow
    /// the source's defaults.
    pub fn from_file(file: FileConfig) -> Result<Self> {
        let mut config = Config::default();
        if let Some(source) = file.source {
            config.source = source;
            config.categories = source.default_categories();
        }
        if let Some(dir) = file.data_dir {
            config.data_dir = dir;
        }
        if let Some(url) = file.article_base_url {
            config.article_base_url = url;
        }
        if let Some(url) = file.api_base_url {
            config.api_base_url = url;
        }
        if let Some(ua) = file.user_agent {
            config.user_agent = ua;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = file.request_delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(n) = file.retries {
            config.retries = n;
        }
        if let Some(ms) = file.retry_base_delay_ms {
            config.retry_base_delay = Duration::from_millis(ms);
        }
        if let Some(names) = file.categories {
            config.categories = parse_categories(&names)?;
        }
        if let Some(layout) = file.layout {
            config.layout = layout;
        }
        if let Some(strict) = file.strict {
            config.strict = strict;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no component could run with.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(OnThisDayError::Config("at least one category is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(OnThisDayError::Config("timeout must be greater than zero".into()));
        }
        for url in [&self.article_base_url, &self.api_base_url] {
            url::Url::parse(url)
                .map_err(|e| OnThisDayError::Config(format!("invalid base URL {url}: {e}")))?;
        }
        if self.source == SourceKind::Html && self.categories.contains(&Category::Holidays) {
            warn!("holidays carry no year on the wiki article and will never be scraped");
        }
        Ok(())
    }
}

/// Parse category names, keeping the first occurrence of each.
pub fn parse_categories<S: AsRef<str>>(names: &[S]) -> Result<Vec<Category>> {
    let mut out: Vec<Category> = Vec::with_capacity(names.len());
    for name in names {
        let category = name.as_ref().parse::<Category>()?;
        if !out.contains(&category) {
            out.push(category);
        }
    }
    Ok(out)
}

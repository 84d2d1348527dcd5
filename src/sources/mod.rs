//! Remote sources of day-event data.
//!
//! Every source implements [`RemoteSource`], a single `fetch` capability that
//! turns a [`DateKey`] into a [`RawPayload`]. Sources perform network I/O
//! only; they never touch the cache.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Payload |
//! |--------|--------|--------|---------|
//! | Wikipedia day article | [`wikipedia`] | HTML scraping | [`RawPayload::Html`] |
//! | Wikimedia on-this-day feed | [`feed`] | REST API | [`RawPayload::Json`] |
//!
//! [`Source`] selects one of them from [`Config`], and [`retry::RetrySource`]
//! wraps any source with bounded exponential backoff.

pub mod feed;
pub mod retry;
pub mod wikipedia;

use crate::config::{Config, SourceKind};
use crate::error::{OnThisDayError, Result};
use crate::models::DateKey;
use std::time::Duration;

pub use feed::FeedSource;
pub use retry::RetrySource;
pub use wikipedia::WikipediaSource;

/// Unparsed response from a remote source.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// An HTML document body.
    Html(String),
    /// A decoded JSON document.
    Json(serde_json::Value),
}

/// A remote source of day-event data.
///
/// Implementors fetch the raw document for a single date. Failures to reach
/// the source are reported as [`OnThisDayError::SourceUnavailable`].
pub trait RemoteSource {
    /// Short identifier recorded alongside cached entries.
    fn name(&self) -> &str;

    /// Fetch the raw document for `date`.
    async fn fetch(&self, date: DateKey) -> Result<RawPayload>;
}

impl<T: RemoteSource> RemoteSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, date: DateKey) -> Result<RawPayload> {
        (**self).fetch(date).await
    }
}

/// The source variant chosen at configuration time.
#[derive(Debug)]
pub enum Source {
    Wikipedia(WikipediaSource),
    Feed(FeedSource),
}

impl Source {
    /// Build the configured source, wrapped with the configured retry policy.
    pub fn from_config(config: &Config) -> Result<RetrySource<Source>> {
        let client = http_client(config)?;
        let source = match config.source {
            SourceKind::Html => {
                Source::Wikipedia(WikipediaSource::new(client, &config.article_base_url)?)
            }
            SourceKind::Api => Source::Feed(FeedSource::new(client, &config.api_base_url)?),
        };
        Ok(RetrySource::new(
            source,
            config.retries,
            config.retry_base_delay,
        ))
    }
}

impl RemoteSource for Source {
    fn name(&self) -> &str {
        match self {
            Source::Wikipedia(s) => s.name(),
            Source::Feed(s) => s.name(),
        }
    }

    async fn fetch(&self, date: DateKey) -> Result<RawPayload> {
        match self {
            Source::Wikipedia(s) => s.fetch(date).await,
            Source::Feed(s) => s.fetch(date).await,
        }
    }
}

/// Shared HTTP client with the configured timeout and user agent.
pub fn http_client(config: &Config) -> Result<reqwest::Client> {
    build_client(config.timeout, &config.user_agent)
}

fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| OnThisDayError::Config(format!("failed to build HTTP client: {e}")))
}

/// Parse a base URL, making sure it ends with `/` so relative joins append
/// rather than replace the last path segment.
pub(crate) fn base_url(raw: &str) -> Result<url::Url> {
    let mut raw = raw.to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    url::Url::parse(&raw).map_err(|e| OnThisDayError::Config(format!("invalid base URL {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_appends_slash() {
        let url = base_url("https://en.wikipedia.org/wiki").unwrap();
        assert_eq!(url.join("July_4").unwrap().as_str(), "https://en.wikipedia.org/wiki/July_4");
    }

    #[test]
    fn test_source_from_config_picks_variant() {
        let mut config = Config::default();
        config.source = SourceKind::Api;
        let source = Source::from_config(&config).unwrap();
        assert_eq!(source.name(), "wikimedia-feed");

        config.source = SourceKind::Html;
        let source = Source::from_config(&config).unwrap();
        assert_eq!(source.name(), "wikipedia");
    }
}

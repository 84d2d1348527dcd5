//! Wikipedia day-article source.
//!
//! Fetches the HTML article for a date, e.g.
//! `https://en.wikipedia.org/wiki/July_4`. The body is returned unparsed;
//! [`crate::parser::html`] extracts the event lists from it.

use super::{RawPayload, RemoteSource, base_url};
use crate::error::{OnThisDayError, Result};
use crate::models::DateKey;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

#[derive(Debug, Clone)]
pub struct WikipediaSource {
    client: Client,
    base: Url,
}

impl WikipediaSource {
    pub fn new(client: Client, article_base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: base_url(article_base_url)?,
        })
    }

    /// Article URL for a date: `<base>/<MonthName>_<Day>`.
    pub fn article_url(&self, date: DateKey) -> Result<Url> {
        self.base
            .join(&date.slug())
            .map_err(|e| OnThisDayError::Config(format!("cannot build article URL: {e}")))
    }
}

impl RemoteSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    #[instrument(level = "info", skip_all, fields(%date))]
    async fn fetch(&self, date: DateKey) -> Result<RawPayload> {
        let url = self.article_url(date)?;
        debug!(%url, "Scraping day article");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OnThisDayError::transport(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OnThisDayError::SourceUnavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| OnThisDayError::transport(url.as_str(), e))?;
        info!(bytes = body.len(), %url, "Fetched day article");
        Ok(RawPayload::Html(body))
    }
}

//! Wikimedia "on this day" REST feed source.
//!
//! Requests `<base>/<MM>/<DD>` and returns the decoded JSON object, whose
//! top-level keys (`events`, `births`, `deaths`, `holidays`, `selected`)
//! each hold an array of items. [`crate::parser::json`] normalizes it.

use super::{RawPayload, RemoteSource, base_url};
use crate::error::{OnThisDayError, Result};
use crate::models::DateKey;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct FeedSource {
    client: Client,
    base: Url,
}

impl FeedSource {
    pub fn new(client: Client, api_base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base: base_url(api_base_url)?,
        })
    }

    /// Endpoint for a date: `<base>/<MM>/<DD>`, zero-padded.
    pub fn endpoint(&self, date: DateKey) -> Result<Url> {
        self.base
            .join(&format!("{:02}/{:02}", date.month(), date.day()))
            .map_err(|e| OnThisDayError::Config(format!("cannot build feed URL: {e}")))
    }
}

impl RemoteSource for FeedSource {
    fn name(&self) -> &str {
        "wikimedia-feed"
    }

    #[instrument(level = "info", skip_all, fields(%date))]
    async fn fetch(&self, date: DateKey) -> Result<RawPayload> {
        let url = self.endpoint(date)?;
        debug!(%url, "Requesting feed");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OnThisDayError::transport(url.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
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
        let json = decode_body(date, &body)?;

        info!(bytes = body.len(), %url, "Fetched feed");
        Ok(RawPayload::Json(json))
    }
}

/// Decode a feed response body; anything that is not JSON is a parse failure.
fn decode_body(date: DateKey, body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, preview = %truncate_for_log(body, 200), "Feed returned non-JSON body");
        OnThisDayError::Parse(format!("feed response for {date} is not JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_zero_padded() {
        let source = FeedSource::new(
            Client::new(),
            "https://api.wikimedia.org/feed/v1/wikipedia/en/onthisday/all",
        )
        .unwrap();
        let url = source.endpoint(DateKey::new(7, 4).unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.wikimedia.org/feed/v1/wikipedia/en/onthisday/all/07/04"
        );
    }

    #[test]
    fn test_decode_body() {
        let date = DateKey::new(7, 4).unwrap();
        let json = decode_body(date, r#"{"events":[{"text":"x","year":1776}]}"#).unwrap();
        assert_eq!(json["events"][0]["year"], 1776);

        let err = decode_body(date, "<html>Service maintenance</html>").unwrap_err();
        assert!(matches!(err, OnThisDayError::Parse(msg) if msg.contains("July 4")));
    }
}

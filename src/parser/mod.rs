//! Conversion of raw source payloads into [`EventRecord`]s.
//!
//! The upstream documents are loosely structured and outside our control, so
//! this is the only place untyped HTML or JSON is handled. Two rules apply:
//!
//! - Individual malformed items (unrelated list entries, blank text, odd
//!   years) are dropped silently. Real pages contain plenty of them.
//! - A missing *structural* landmark (the events heading, a category key)
//!   means the upstream format changed and is reported as
//!   [`OnThisDayError::Parse`](crate::error::OnThisDayError::Parse).
//!
//! # Submodules
//!
//! - [`html`]: Wikipedia day-article scraping
//! - [`json`]: Wikimedia feed normalization

pub mod html;
pub mod json;

use crate::error::Result;
use crate::models::{Category, EventRecord};
use crate::sources::RawPayload;
use tracing::debug;

/// Parse a raw payload, keeping only the requested categories.
///
/// Output follows source order, category by category; nothing is sorted or
/// deduplicated.
pub fn parse(payload: &RawPayload, categories: &[Category]) -> Result<Vec<EventRecord>> {
    let records = match payload {
        RawPayload::Html(body) => html::parse_day_article(body, categories)?,
        RawPayload::Json(value) => json::parse_feed(value, categories)?,
    };
    debug!(count = records.len(), "Parsed day payload");
    Ok(records)
}

/// Normalize a year label such as `"1969"`, `"1969 AD"` or `"44 BC"`.
///
/// BC years become negative. Returns `None` for anything else.
pub fn parse_year_label(label: &str) -> Option<i32> {
    let mut parts = label.split_whitespace();
    let digits = parts.next()?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    let year = match parts.next() {
        None | Some("AD") => year,
        Some("BC") => -year,
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(year)
}

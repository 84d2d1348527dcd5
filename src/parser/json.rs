//! Wikimedia feed normalization.
//!
//! The feed returns one array per category. Each item carries `text`, an
//! optional `year` and a lot of page metadata we do not keep:
//!
//! ```json
//! {
//!   "events":   [{ "text": "Apollo 11 ...", "year": 1969, "pages": [ ... ] }],
//!   "births":   [{ "text": "George W. Bush ...", "year": 1946, "pages": [ ... ] }],
//!   "holidays": [{ "text": "Independence Day\n(United States)", "pages": [ ... ] }]
//! }
//! ```

use super::parse_year_label;
use crate::error::{OnThisDayError, Result};
use crate::models::{Category, EventRecord};
use crate::utils::collapse_whitespace;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// The fields we keep from a feed item; everything else is discarded.
#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    year: Option<Value>,
}

/// Normalize a decoded feed payload.
///
/// # Errors
///
/// Returns [`OnThisDayError::Parse`] when the payload is not an object, or
/// when a requested category key is absent or not an array.
pub fn parse_feed(payload: &Value, categories: &[Category]) -> Result<Vec<EventRecord>> {
    let object = payload
        .as_object()
        .ok_or_else(|| OnThisDayError::Parse("feed payload is not a JSON object".to_string()))?;

    let mut records = Vec::new();
    for &category in categories {
        let items = object
            .get(category.as_str())
            .ok_or_else(|| {
                OnThisDayError::Parse(format!("feed payload has no \"{category}\" key"))
            })?
            .as_array()
            .ok_or_else(|| {
                OnThisDayError::Parse(format!("feed \"{category}\" value is not an array"))
            })?;

        let before = records.len();
        records.extend(items.iter().filter_map(|item| normalize_item(category, item)));
        debug!(
            %category,
            kept = records.len() - before,
            dropped = items.len() - (records.len() - before),
            "Normalized feed items"
        );
    }
    Ok(records)
}

fn normalize_item(category: Category, item: &Value) -> Option<EventRecord> {
    let item = FeedItem::deserialize(item).ok()?;
    let text = collapse_whitespace(item.text.as_deref()?);
    let year = match item.year {
        None | Some(Value::Null) => None,
        Some(value) => Some(normalize_year(&value)?),
    };
    EventRecord::new(category, year, &text)
}

/// Integer years are taken as-is (negative means BC); string years go
/// through the same label rules as scraped items.
fn normalize_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => parse_year_label(s.trim()),
        _ => None,
    }
}

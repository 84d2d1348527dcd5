//! The single-day fetch → parse → store cycle.
//!
//! Both the bulk downloader and the query engine's cache-fill-on-miss go
//! through [`fetch_day`], so a day is always acquired the same way.

use crate::error::Result;
use crate::models::{Category, DateKey, EventRecord};
use crate::parser;
use crate::sources::RemoteSource;
use crate::store::{CacheStore, WriteOutcome};
use std::time::Instant;
use tracing::{info, instrument};

/// What one pipeline run produced.
#[derive(Debug, Clone)]
pub struct DayFetch {
    pub records: Vec<EventRecord>,
    pub outcome: WriteOutcome,
}

/// Fetch, parse and persist one day.
///
/// Nothing is written unless both the fetch and the parse succeed, so a
/// failure leaves any previous entry untouched.
#[instrument(level = "info", skip_all, fields(%date, source = source.name()))]
pub async fn fetch_day<S: RemoteSource>(
    source: &S,
    store: &CacheStore,
    categories: &[Category],
    date: DateKey,
    overwrite: bool,
) -> Result<DayFetch> {
    let t0 = Instant::now();
    let payload = source.fetch(date).await?;
    let records = parser::parse(&payload, categories)?;
    let outcome = store
        .store_day(date, categories, source.name(), &records, overwrite)
        .await?;

    info!(
        count = records.len(),
        ?outcome,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Acquired day"
    );
    Ok(DayFetch { records, outcome })
}

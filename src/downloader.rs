//! Bulk acquisition of every calendar date.
//!
//! [`Downloader::download_all`] walks the 366 [`DateKey`]s in calendar order
//! and runs the single-day pipeline for each one that needs it, pausing
//! between fetches to go easy on the remote source.
//!
//! # Failure policy
//!
//! By default one bad day must not sink the other 365: the error is logged,
//! recorded in [`DownloadReport::failed`] and the loop moves on. With
//! `strict` enabled the first failure aborts the run instead. Either way a
//! failing day never touches its existing cache entry.

use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, DateKey};
use crate::pipeline::fetch_day;
use crate::sources::RemoteSource;
use crate::store::{CacheStore, WriteOutcome};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Summary of a bulk download.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    /// Days for which a fetch was attempted.
    pub fetched: usize,
    pub written: usize,
    /// Days left alone because an entry already existed.
    pub skipped: usize,
    /// Days that failed, with the error message.
    pub failed: Vec<(DateKey, String)>,
}

impl DownloadReport {
    /// True when no day failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct Downloader<S> {
    source: S,
    store: CacheStore,
    categories: Vec<Category>,
    request_delay: Duration,
    strict: bool,
}

impl<S: RemoteSource> Downloader<S> {
    pub fn new(
        source: S,
        store: CacheStore,
        categories: Vec<Category>,
        request_delay: Duration,
        strict: bool,
    ) -> Self {
        Self {
            source,
            store,
            categories,
            request_delay,
            strict,
        }
    }

    /// Build from configuration, taking the categories, delay and
    /// strictness from it.
    pub fn from_config(source: S, store: CacheStore, config: &Config) -> Self {
        Self::new(
            source,
            store,
            config.categories.clone(),
            config.request_delay,
            config.strict,
        )
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Acquire every calendar date.
    ///
    /// With `overwrite == false`, dates already cached are skipped without a
    /// fetch. With `overwrite == true` every date is re-fetched and replaced.
    ///
    /// # Errors
    ///
    /// Only in strict mode: the first per-day failure is returned as is.
    /// Otherwise failures are collected in the report.
    #[instrument(level = "info", skip_all, fields(overwrite = overwrite, strict = self.strict))]
    pub async fn download_all(&self, overwrite: bool) -> Result<DownloadReport> {
        let t0 = Instant::now();
        let mut report = DownloadReport::default();
        let mut first_fetch = true;

        info!(
            source = self.source.name(),
            root = %self.store.root().display(),
            "Downloading all days"
        );

        for date in DateKey::all() {
            let cached = if overwrite {
                Ok(false)
            } else {
                self.store.has_day(date, &self.categories).await
            };

            let result = match cached {
                Ok(true) => {
                    debug!(%date, "Already cached; skipping");
                    report.skipped += 1;
                    continue;
                }
                Ok(false) => {
                    if !first_fetch && !self.request_delay.is_zero() {
                        sleep(self.request_delay).await;
                    }
                    first_fetch = false;
                    report.fetched += 1;
                    fetch_day(&self.source, &self.store, &self.categories, date, overwrite).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(day) => match day.outcome {
                    WriteOutcome::Written => report.written += 1,
                    WriteOutcome::Skipped => report.skipped += 1,
                },
                Err(e) if self.strict => {
                    error!(%date, error = %e, "Day failed; aborting (strict)");
                    return Err(e);
                }
                Err(e) => {
                    warn!(%date, error = %e, "Day failed; continuing");
                    report.failed.push((date, e.to_string()));
                }
            }
        }

        let elapsed = t0.elapsed();
        info!(
            fetched = report.fetched,
            written = report.written,
            skipped = report.skipped,
            failed = report.failed.len(),
            secs = elapsed.as_secs(),
            "Download complete"
        );
        if !report.is_complete() {
            let dates: Vec<String> = report.failed.iter().map(|(d, _)| d.to_string()).collect();
            warn!(dates = %dates.join(", "), "Some days could not be downloaded");
        }
        Ok(report)
    }
}

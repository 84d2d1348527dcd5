//! On-disk cache of parsed day events.
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! ├── January_1.json              # Layout::PerDay
//! ├── ...
//! ├── July_4.events.json          # Layout::PerCategory
//! ├── July_4.births.json
//! └── ...
//! ```
//!
//! Each file is a pretty-printed [`CacheEntry`]. Entries are replaced
//! wholesale: the new content is written to a `.tmp` sibling and renamed over
//! the target, so a reader sees either the old entry or the new one, never a
//! partial file.

use crate::config::Layout;
use crate::error::{OnThisDayError, Result};
use crate::models::{CacheEntry, Category, DateKey, EventRecord};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Result of a cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// An entry already existed and overwrite was not requested.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    layout: Layout,
}

impl CacheStore {
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// File backing the entry for `date`, or for one category slice of it.
    pub fn entry_path(&self, date: DateKey, category: Option<Category>) -> PathBuf {
        let name = match category {
            None => format!("{}.json", date.slug()),
            Some(c) => format!("{}.{}.json", date.slug(), c),
        };
        self.root.join(name)
    }

    pub async fn exists(&self, date: DateKey, category: Option<Category>) -> Result<bool> {
        let path = self.entry_path(date, category);
        fs::try_exists(&path)
            .await
            .map_err(|e| OnThisDayError::io(&path, e))
    }

    /// Persist `records` as the entry for `date` (and `category`, if given).
    ///
    /// With `overwrite == false` an existing entry is left untouched and
    /// [`WriteOutcome::Skipped`] is returned.
    #[instrument(level = "debug", skip_all, fields(%date, category = ?category, count = records.len()))]
    pub async fn write(
        &self,
        date: DateKey,
        category: Option<Category>,
        source: &str,
        records: &[EventRecord],
        overwrite: bool,
    ) -> Result<WriteOutcome> {
        if !overwrite && self.exists(date, category).await? {
            debug!("Entry exists; skipping write");
            return Ok(WriteOutcome::Skipped);
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| OnThisDayError::io(&self.root, e))?;

        let entry = CacheEntry {
            month: date.month(),
            day: date.day(),
            category,
            fetched_at: Utc::now().to_rfc3339(),
            source: source.to_string(),
            events: records.to_vec(),
        };
        let path = self.entry_path(date, category);
        let json = serde_json::to_string_pretty(&entry).map_err(|e| OnThisDayError::CorruptEntry {
            path: path.clone(),
            source: e,
        })?;

        write_atomic(&path, json.as_bytes()).await?;
        debug!(path = %path.display(), "Wrote cache entry");
        Ok(WriteOutcome::Written)
    }

    /// Read back the entry for `date` (and `category`, if given).
    ///
    /// # Errors
    ///
    /// - [`OnThisDayError::CacheMiss`] if no entry exists
    /// - [`OnThisDayError::CorruptEntry`] if the file does not decode
    pub async fn read(&self, date: DateKey, category: Option<Category>) -> Result<Vec<EventRecord>> {
        let path = self.entry_path(date, category);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = match category {
                    Some(c) => format!("{date} ({c})"),
                    None => date.to_string(),
                };
                return Err(OnThisDayError::CacheMiss(key));
            }
            Err(e) => return Err(OnThisDayError::io(&path, e)),
        };

        let entry: CacheEntry = serde_json::from_str(&text).map_err(|e| OnThisDayError::CorruptEntry {
            path: path.clone(),
            source: e,
        })?;
        if (entry.month, entry.day) != (date.month(), date.day()) {
            warn!(
                path = %path.display(),
                month = entry.month,
                day = entry.day,
                "Cache entry was written for a different date"
            );
        }
        Ok(entry.events)
    }

    /// Whether the configured layout holds a complete entry for `date`.
    pub async fn has_day(&self, date: DateKey, categories: &[Category]) -> Result<bool> {
        match self.layout {
            Layout::PerDay => self.exists(date, None).await,
            Layout::PerCategory => {
                for &category in categories {
                    if !self.exists(date, Some(category)).await? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Store a whole day's records according to the configured layout.
    ///
    /// In [`Layout::PerCategory`] every configured category gets a file, even
    /// an empty one, so [`CacheStore::has_day`] can tell a fetched day from a
    /// missing one. Reports `Written` if any file was written.
    pub async fn store_day(
        &self,
        date: DateKey,
        categories: &[Category],
        source: &str,
        records: &[EventRecord],
        overwrite: bool,
    ) -> Result<WriteOutcome> {
        match self.layout {
            Layout::PerDay => self.write(date, None, source, records, overwrite).await,
            Layout::PerCategory => {
                let mut outcome = WriteOutcome::Skipped;
                for &category in categories {
                    let slice: Vec<EventRecord> = records
                        .iter()
                        .filter(|r| r.category == category)
                        .cloned()
                        .collect();
                    if self.write(date, Some(category), source, &slice, overwrite).await?
                        == WriteOutcome::Written
                    {
                        outcome = WriteOutcome::Written;
                    }
                }
                Ok(outcome)
            }
        }
    }

    /// Load a whole day according to the configured layout.
    ///
    /// Fails with [`OnThisDayError::CacheMiss`] if any required file is absent.
    pub async fn load_day(&self, date: DateKey, categories: &[Category]) -> Result<Vec<EventRecord>> {
        match self.layout {
            Layout::PerDay => self.read(date, None).await,
            Layout::PerCategory => {
                let mut records = Vec::new();
                for &category in categories {
                    records.extend(self.read(date, Some(category)).await?);
                }
                Ok(records)
            }
        }
    }

    /// Number of per-day entries currently present, for status reporting.
    pub async fn count_days(&self, categories: &[Category]) -> Result<usize> {
        let mut count = 0;
        for date in DateKey::all() {
            if self.has_day(date, categories).await? {
                count += 1;
            }
        }
        info!(count, root = %self.root.display(), "Counted cached days");
        Ok(count)
    }

    /// Delete `*.json.tmp` files left by an interrupted write.
    ///
    /// A missing root counts as clean. Returns how many files were removed.
    pub async fn remove_stale_temp_files(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(OnThisDayError::io(&self.root, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OnThisDayError::io(&self.root, e))?
        {
            let path = entry.path();
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
            if !is_temp {
                continue;
            }
            fs::remove_file(&path)
                .await
                .map_err(|e| OnThisDayError::io(&path, e))?;
            debug!(path = %path.display(), "Removed stale temp file");
            removed += 1;
        }
        if removed > 0 {
            warn!(removed, root = %self.root.display(), "Cleaned up interrupted writes");
        }
        Ok(removed)
    }
}

const TEMP_SUFFIX: &str = ".json.tmp";

/// Write `bytes` to `path` so readers only ever see the complete file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!("{stem}{TEMP_SUFFIX}"));

    fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| OnThisDayError::io(&tmp_path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(OnThisDayError::io(path, e));
    }
    Ok(())
}

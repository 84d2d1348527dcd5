//! # onthisday
//!
//! Acquires "on this day in history" records for every calendar date,
//! normalizes them into [`EventRecord`]s, keeps them in a local file cache
//! and answers point queries against that cache.
//!
//! ## Architecture
//!
//! The crate follows a pipeline architecture:
//! 1. **Fetching** ([`sources`]): download a day's raw page or feed document
//! 2. **Parsing** ([`parser`]): turn the raw payload into typed records,
//!    silently dropping fragments that are not events
//! 3. **Storing** ([`store`]): atomically replace the day's cache entry
//! 4. **Querying** ([`query`]): read a day back, filter by category, pick
//!    one at random; a missing day is fetched on demand
//!
//! [`downloader`] drives steps 1–3 across all 366 dates.
//!
//! ## Usage
//!
//! ```ignore
//! let config = Config::default();
//! let source = Source::from_config(&config)?;
//! let store = CacheStore::new(&config.data_dir, config.layout);
//! let engine = QueryEngine::from_config(source, store, &config);
//! let event = engine.get_random_event(DateKey::today(), &CategoryFilter::All).await?;
//! println!("{}", event.display_line());
//! ```

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod models;
pub mod outputs;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod sources;
pub mod store;
pub mod utils;

pub use config::{Config, Layout, SourceKind};
pub use downloader::{DownloadReport, Downloader};
pub use error::{OnThisDayError, Result};
pub use models::{Category, CategoryFilter, DateKey, EventRecord};
pub use query::QueryEngine;
pub use sources::{RawPayload, RemoteSource, Source};
pub use store::{CacheStore, WriteOutcome};

//! Command-line interface definitions for onthisday.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options can also be provided via environment variables, and a YAML
//! file given with `--config` supplies anything not set on the command line.

use crate::config::{Config, FileConfig, Layout, SourceKind, parse_categories};
use crate::error::Result;
use crate::models::{CategoryFilter, DateKey};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for onthisday.
///
/// # Examples
///
/// ```sh
/// # A random event for today
/// onthisday random
///
/// # Every birth and death on July 4th
/// onthisday events -d 07/04 -c births -c deaths
///
/// # Populate the whole cache from the REST feed
/// onthisday --source api download
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about = "Downloads and prints historic events for any calendar date")]
pub struct Cli {
    /// Directory holding the event cache
    #[arg(long, global = true, env = "ONTHISDAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(long, global = true, env = "ONTHISDAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote source to fetch days from
    #[arg(long, global = true, value_enum, env = "ONTHISDAY_SOURCE")]
    pub source: Option<SourceKind>,

    /// On-disk cache layout
    #[arg(long, global = true, value_enum)]
    pub layout: Option<Layout>,

    /// Categories to fetch and cache (repeatable; defaults depend on the source)
    #[arg(long = "fetch-category", global = true)]
    pub fetch_categories: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a random historic event that occurred on the date
    Random(QueryArgs),
    /// Print every historic event that occurred on the date
    Events {
        #[command(flatten)]
        query: QueryArgs,
        /// Print a heading before each category
        #[arg(short, long)]
        grouped: bool,
    },
    /// Download the events for every calendar date into the cache
    Download {
        /// Re-fetch and replace days that are already cached
        #[arg(long)]
        overwrite: bool,
        /// Abort on the first day that fails
        #[arg(long)]
        strict: bool,
        /// Pause between requests, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Date of the historic events (format: MONTH/DAY); defaults to today
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<DateKey>,

    /// Only show these categories (repeatable): events, births, deaths, holidays
    #[arg(short, long = "category")]
    pub categories: Vec<String>,
}

impl QueryArgs {
    pub fn date(&self) -> DateKey {
        self.date.unwrap_or_else(DateKey::today)
    }

    pub fn filter(&self) -> Result<CategoryFilter> {
        CategoryFilter::parse(&self.categories)
    }
}

fn parse_date(s: &str) -> std::result::Result<DateKey, String> {
    s.parse::<DateKey>().map_err(|e| e.to_string())
}

impl Cli {
    /// Resolve the final configuration: defaults, then the YAML file, then
    /// flags and environment.
    pub fn resolve_config(&self) -> Result<Config> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let file_sets_categories = file.categories.is_some();
        let mut config = Config::from_file(file)?;

        if let Some(source) = self.source {
            // Categories chosen explicitly in the file survive a source switch.
            if source != config.source && !file_sets_categories {
                config.categories = source.default_categories();
            }
            config.source = source;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if !self.fetch_categories.is_empty() {
            config.categories = parse_categories(&self.fetch_categories)?;
        }
        if let Command::Download {
            strict, delay_ms, ..
        } = &self.command
        {
            config.strict |= *strict;
            if let Some(ms) = delay_ms {
                config.request_delay = std::time::Duration::from_millis(*ms);
            }
        }
        config.validate()?;
        Ok(config)
    }
}

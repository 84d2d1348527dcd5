//! Data models for dates, categories and normalized event records.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`DateKey`]: a year-less calendar date, the identity of every cache entry
//! - [`Category`]: the closed set of event kinds
//! - [`EventRecord`]: one normalized event (category, optional year, text)
//! - [`CategoryFilter`]: caller-supplied category selection
//! - [`CacheEntry`]: the on-disk form of a day's events

use crate::error::{OnThisDayError, Result};
use chrono::{Datelike, Local, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Leap year used to validate month/day pairs, so February 29 is a legal key.
pub const REFERENCE_LEAP_YEAR: i32 = 2012;

/// A calendar date without a year.
///
/// Events recur by month and day across all years, so the year is never part
/// of the key. Ordering is calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateKey")]
pub struct DateKey {
    month: u32,
    day: u32,
}

/// Unvalidated wire form of a [`DateKey`].
#[derive(Deserialize)]
struct RawDateKey {
    month: u32,
    day: u32,
}

impl TryFrom<RawDateKey> for DateKey {
    type Error = OnThisDayError;

    fn try_from(raw: RawDateKey) -> Result<Self> {
        DateKey::new(raw.month, raw.day)
    }
}

impl DateKey {
    /// Build a key, validating it against [`REFERENCE_LEAP_YEAR`].
    ///
    /// # Errors
    ///
    /// Returns [`OnThisDayError::InvalidDate`] when the month is outside
    /// 1–12 or the day does not exist in that month.
    pub fn new(month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or_else(|| OnThisDayError::InvalidDate(format!("{month:02}/{day:02}")))
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        let now = Local::now();
        Self {
            month: now.month(),
            day: now.day(),
        }
    }

    /// Every valid key in calendar order: 366 entries, February 29 included.
    pub fn all() -> impl Iterator<Item = DateKey> {
        (1..=12u32).flat_map(|month| (1..=31u32).filter_map(move |day| DateKey::new(month, day).ok()))
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// English month name, e.g. `"July"`.
    pub fn month_name(&self) -> &'static str {
        // `new` guarantees 1..=12, so the conversion cannot fail.
        Month::try_from(self.month as u8)
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Article-style identifier, e.g. `"July_4"`.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.month_name(), self.day)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.day)
    }
}

/// Parses `MM/DD` (leading zeros optional).
impl FromStr for DateKey {
    type Err = OnThisDayError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OnThisDayError::InvalidDate(s.to_string());
        let (month, day) = s.trim().split_once('/').ok_or_else(invalid)?;
        let month = month.trim().parse::<u32>().map_err(|_| invalid())?;
        let day = day.trim().parse::<u32>().map_err(|_| invalid())?;
        DateKey::new(month, day)
    }
}

/// The kind of an event record.
///
/// The set is closed; it drives both filtering and the display template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Events,
    Births,
    Deaths,
    Holidays,
}

impl Category {
    /// Canonical order, also the order categories are emitted per day.
    pub const ALL: [Category; 4] = [
        Category::Events,
        Category::Births,
        Category::Deaths,
        Category::Holidays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Events => "events",
            Category::Births => "births",
            Category::Deaths => "deaths",
            Category::Holidays => "holidays",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = OnThisDayError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| OnThisDayError::InvalidCategory(s.to_string()))
    }
}

/// A normalized historic event.
///
/// `text` is stored raw (no category phrasing); templates are applied only
/// when rendering through [`EventRecord::display_line`]. A negative `year`
/// denotes BC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventRecord {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub text: String,
}

impl EventRecord {
    /// Build a record, returning `None` when the text is blank after trimming.
    pub fn new(category: Category, year: Option<i32>, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            category,
            year,
            text: text.to_string(),
        })
    }

    /// Human-readable year: `"1969"`, `"44 BC"`, or `None` for undated records.
    pub fn year_label(&self) -> Option<String> {
        self.year.map(|y| {
            if y < 0 {
                format!("{} BC", y.unsigned_abs())
            } else {
                y.to_string()
            }
        })
    }

    /// Apply the category's display template.
    ///
    /// ```ignore
    /// // events:   "1969 – Apollo 11 lands on the Moon"
    /// // births:   "1946 – Born: George W. Bush"
    /// // deaths:   "1826 – Died: Thomas Jefferson"
    /// // holidays: "Independence Day (United States)"
    /// ```
    pub fn display_line(&self) -> String {
        let body = match self.category {
            Category::Events | Category::Holidays => self.text.clone(),
            Category::Births => format!("Born: {}", self.text),
            Category::Deaths => format!("Died: {}", self.text),
        };
        match self.year_label() {
            Some(year) => format!("{year} – {body}"),
            None => body,
        }
    }
}

/// Which categories a query should return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(BTreeSet<Category>),
}

impl CategoryFilter {
    /// Build a filter from caller-supplied names. An empty list selects all.
    ///
    /// # Errors
    ///
    /// Returns [`OnThisDayError::InvalidCategory`] for any unknown name.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Ok(CategoryFilter::All);
        }
        let set = names
            .iter()
            .map(|n| n.as_ref().parse::<Category>())
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(CategoryFilter::Only(set))
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(set) => set.contains(&category),
        }
    }

    /// Keep the records whose category passes, preserving order.
    pub fn apply(&self, records: Vec<EventRecord>) -> Vec<EventRecord> {
        records.into_iter().filter(|r| self.matches(r.category)).collect()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(set) => {
                let names: Vec<&str> = set.iter().map(Category::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

/// The persisted form of one day's events, or of one category slice of it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheEntry {
    pub month: u32,
    pub day: u32,
    /// Set when the entry holds a single category slice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// RFC 3339 timestamp of the fetch that produced this entry.
    pub fetched_at: String,
    /// Name of the remote source the events came from.
    pub source: String,
    pub events: Vec<EventRecord>,
}

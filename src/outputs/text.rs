//! Plain-text rendering for the command line.

use crate::models::{DateKey, EventRecord};
use itertools::Itertools;
use std::fmt::Write;

/// English ordinal suffix for a day number: `1st`, `2nd`, `11th`, `23rd`.
pub fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// `"July 4th, 1776 – The Declaration of Independence is adopted."`
pub fn random_line(date: DateKey, record: &EventRecord) -> String {
    format!("{} {}, {}", date.month_name(), ordinal(date.day()), record.display_line())
}

/// One line per record. With `grouped`, each run of a category gets a
/// heading line.
pub fn event_list(records: &[EventRecord], grouped: bool) -> String {
    let mut out = String::new();
    if !grouped {
        for record in records {
            let _ = writeln!(out, "{}", record.display_line());
        }
        return out;
    }

    for (category, run) in &records.iter().chunk_by(|r| r.category) {
        let heading = category.as_str();
        let mut chars = heading.chars();
        let heading: String = chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
        let _ = writeln!(out, "== {heading} ==");
        for record in run {
            let _ = writeln!(out, "{}", record.display_line());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_random_line() {
        let date = DateKey::new(7, 4).unwrap();
        let record = EventRecord::new(Category::Events, Some(1776), "Independence").unwrap();
        assert_eq!(random_line(date, &record), "July 4th, 1776 – Independence");
    }

    #[test]
    fn test_event_list_grouped() {
        let records = vec![
            EventRecord::new(Category::Events, Some(1776), "A").unwrap(),
            EventRecord::new(Category::Events, Some(1777), "B").unwrap(),
            EventRecord::new(Category::Deaths, Some(1826), "C").unwrap(),
        ];
        assert_eq!(event_list(&records, false), "1776 – A\n1777 – B\n1826 – Died: C\n");
        assert_eq!(
            event_list(&records, true),
            "== Events ==\n1776 – A\n1777 – B\n== Deaths ==\n1826 – Died: C\n"
        );
    }
}

#![allow(dead_code)]

use onthisday::{DateKey, OnThisDayError, RawPayload, RemoteSource, Result};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which payload shape the stub serves.
#[derive(Debug, Clone, Copy)]
pub enum StubKind {
    Html,
    Json,
    /// A page whose layout no longer has an Events heading.
    BrokenHtml,
}

/// In-memory stand-in for a remote source that counts fetches.
pub struct StubSource {
    kind: StubKind,
    fetches: AtomicUsize,
    fail_on: Vec<DateKey>,
    fetched: Mutex<Vec<DateKey>>,
}

impl StubSource {
    pub fn new(kind: StubKind) -> Self {
        Self {
            kind,
            fetches: AtomicUsize::new(0),
            fail_on: Vec::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, dates: &[DateKey]) -> Self {
        self.fail_on = dates.to_vec();
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetched_dates(&self) -> Vec<DateKey> {
        self.fetched.lock().unwrap().clone()
    }
}

impl RemoteSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, date: DateKey) -> Result<RawPayload> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(date);

        if self.fail_on.contains(&date) {
            return Err(OnThisDayError::SourceUnavailable {
                url: format!("stub://{}", date.slug()),
                status: Some(503),
                reason: "HTTP 503 Service Unavailable".to_string(),
            });
        }

        Ok(match self.kind {
            StubKind::Html => RawPayload::Html(day_article(date)),
            StubKind::Json => RawPayload::Json(feed_payload(date)),
            StubKind::BrokenHtml => {
                RawPayload::Html("<html><body><h2 id=\"Chronology\">Chronology</h2></body></html>".into())
            }
        })
    }
}

/// A small day article in current wiki markup: two events, one birth, no
/// deaths, plus noise the parser must drop.
pub fn day_article(date: DateKey) -> String {
    format!(
        r#"<html><body><div class="mw-parser-output">
<p>{date} is a day of the year.</p>
<div class="mw-heading mw-heading2"><h2 id="Events">Events</h2></div>
<ul>
<li>44 BC – Something ancient happened on {date}<sup class="reference">[1]</sup></li>
<li>1969 – Something modern happened on {date}</li>
<li>See also the list of anniversaries</li>
</ul>
<div class="mw-heading mw-heading2"><h2 id="Births">Births</h2></div>
<ul><li>1946 – Someone born on {date}</li></ul>
<div class="mw-heading mw-heading2"><h2 id="Deaths">Deaths</h2></div>
<ul></ul>
<div class="mw-heading mw-heading2"><h2 id="References">References</h2></div>
<ul><li>2001 – Not an event</li></ul>
</div></body></html>"#
    )
}

pub fn feed_payload(date: DateKey) -> serde_json::Value {
    serde_json::json!({
        "events": [
            { "text": format!("Feed event on {date}"), "year": 1969, "pages": [] }
        ],
        "births": [],
        "deaths": [
            { "text": format!("Someone died on {date}"), "year": -4 }
        ],
        "holidays": [
            { "text": "A\nholiday", "pages": [] }
        ]
    })
}

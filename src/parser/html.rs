//! Wikipedia day-article scraping.
//!
//! A day article has one top-level section per category ("Events",
//! "Births", "Deaths", ...). Each section is a run of sibling blocks that
//! follows its heading up to the next top-level heading. The event lists
//! are the `<ul>` elements inside that run, sometimes wrapped in column
//! `<div>`s and interleaved with `<h3>` sub-headings for eras.
//!
//! Two heading markups are recognized:
//!
//! ```text
//! <div class="mw-heading mw-heading2"><h2 id="Events">Events</h2></div>   current
//! <h2><span class="mw-headline" id="Events">Events</span></h2>            legacy
//! ```
//!
//! List items are accepted only when their visible text looks like
//! `<year>[ BC|AD] – <description>`; everything else on the page is ignored.

use super::parse_year_label;
use crate::error::{OnThisDayError, Result};
use crate::models::{Category, EventRecord};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

/// The sole structural gate for an item: `<digits>[ BC|AD] – <text>`.
static ITEM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\s+(?:BC|AD))?)\s*–.+$").expect("valid item regex"));

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));

/// Separator between the year prefix and the description.
const SEPARATOR: &str = " – ";

/// Elements whose text is never part of an item (citation markers and the like).
const HIDDEN_ELEMENTS: [&str; 3] = ["sup", "style", "script"];

/// Nested lists hold their own items; their text never belongs to the parent.
const LIST_ELEMENTS: [&str; 2] = ["ul", "ol"];

/// Heading anchor id for a category, if the article has such a section.
fn section_id(category: Category) -> Option<&'static str> {
    match category {
        Category::Events => Some("Events"),
        Category::Births => Some("Births"),
        Category::Deaths => Some("Deaths"),
        // Holiday entries carry no year and would never pass the item gate.
        Category::Holidays => None,
    }
}

/// Extract the requested categories from a day article.
///
/// # Errors
///
/// Returns [`OnThisDayError::Parse`] when the page has no "Events" section,
/// which means the article layout has changed.
pub fn parse_day_article(body: &str, categories: &[Category]) -> Result<Vec<EventRecord>> {
    let document = Html::parse_document(body);

    if find_anchor(&document, "Events").is_none() {
        return Err(OnThisDayError::Parse(
            "day article has no \"Events\" section heading".to_string(),
        ));
    }

    let mut records = Vec::new();
    for &category in categories {
        let Some(id) = section_id(category) else {
            debug!(%category, "Category not available from day articles; skipping");
            continue;
        };
        let Some(anchor) = find_anchor(&document, id) else {
            warn!(%category, "Section missing from day article");
            continue;
        };
        let before = records.len();
        for item in section_items(heading_block(anchor)) {
            if let Some(record) = parse_item(category, &item) {
                records.push(record);
            }
        }
        debug!(%category, count = records.len() - before, "Scraped section");
    }
    Ok(records)
}

/// Turn one list item's visible text into a record, or `None` if the item
/// is not an event line.
///
/// ```ignore
/// parse_item(Category::Events, "1969 – Apollo 11 landed on the Moon")  // Some(1969, ...)
/// parse_item(Category::Events, "44 BC – Caesar assassinated")           // Some(-44, ...)
/// parse_item(Category::Events, "Some random sentence with no dash")    // None
/// ```
pub fn parse_item(category: Category, raw_text: &str) -> Option<EventRecord> {
    let text = collapse_whitespace(raw_text);
    let captures = ITEM_PATTERN.captures(&text)?;

    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    if parts.len() != 2 {
        return None;
    }
    let (prefix, description) = (parts[0].trim(), parts[1].trim());
    if prefix.is_empty() || description.is_empty() {
        return None;
    }

    let year = parse_year_label(captures.get(1)?.as_str())?;
    EventRecord::new(category, Some(year), description)
}

/// Locate a section anchor by id.
fn find_anchor<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!(r#"[id="{id}"]"#)).ok()?;
    document.select(&selector).next()
}

/// Climb from an anchor to the block that sits among the section's siblings.
fn heading_block(anchor: ElementRef<'_>) -> ElementRef<'_> {
    let mut block = anchor;

    // Legacy markup: <h2><span class="mw-headline" id=...></span></h2>
    if !is_heading(block) {
        if let Some(parent) = parent_element(block).filter(|p| is_heading(*p)) {
            block = parent;
        }
    }

    // Current markup: <div class="mw-heading mw-heading2"><h2 id=...></h2></div>
    if let Some(parent) = parent_element(block).filter(|p| has_class(*p, "mw-heading")) {
        block = parent;
    }
    block
}

/// Visible text of every list item between a heading block and the next
/// top-level heading.
fn section_items(block: ElementRef<'_>) -> Vec<String> {
    let mut items = Vec::new();
    for sibling in block.next_siblings().filter_map(ElementRef::wrap) {
        if is_section_break(sibling) {
            break;
        }
        if !matches!(sibling.value().name(), "ul" | "div") {
            continue;
        }
        for li in sibling.select(&LIST_ITEM) {
            // "1863 – American Civil War:" heading a sub-list is a group, not an event.
            if has_nested_list(li) {
                debug!("Skipping grouped list item");
                continue;
            }
            let mut text = String::new();
            push_visible_text(li, &mut text);
            items.push(text);
        }
    }
    items
}

/// Append the text of `element`, skipping hidden sub-elements.
fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el)
                if HIDDEN_ELEMENTS.contains(&el.name()) || LIST_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_visible_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn has_nested_list(item: ElementRef<'_>) -> bool {
    item.children()
        .filter_map(ElementRef::wrap)
        .any(|child| LIST_ELEMENTS.contains(&child.value().name()))
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// A top-level (h2) heading ends the section; sub-headings do not.
fn is_section_break(element: ElementRef<'_>) -> bool {
    element.value().name() == "h2" || has_class(element, "mw-heading2")
}

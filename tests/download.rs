mod common;

use common::{StubKind, StubSource};
use onthisday::{
    CacheStore, Category, DateKey, Downloader, EventRecord, Layout, OnThisDayError,
};
use std::time::Duration;

const HTML_CATEGORIES: [Category; 3] = [Category::Events, Category::Births, Category::Deaths];

fn downloader<'a>(
    source: &'a StubSource,
    store: &CacheStore,
    strict: bool,
) -> Downloader<&'a StubSource> {
    Downloader::new(
        source,
        store.clone(),
        HTML_CATEGORIES.to_vec(),
        Duration::ZERO,
        strict,
    )
}

#[tokio::test]
async fn download_all_then_read_every_date() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let source = StubSource::new(StubKind::Html);

    let report = downloader(&source, &store, false).download_all(false).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.fetched, 366);
    assert_eq!(report.written, 366);
    assert_eq!(report.skipped, 0);

    for date in DateKey::all() {
        let records = store.read(date, None).await.unwrap();
        assert_eq!(records.len(), 3, "unexpected records for {date}");
        assert_eq!(records[0].year, Some(-44));
        assert_eq!(records[2].category, Category::Births);
    }
}

#[tokio::test]
async fn dates_are_fetched_in_calendar_order() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let source = StubSource::new(StubKind::Html);

    downloader(&source, &store, false).download_all(false).await.unwrap();
    let fetched = source.fetched_dates();
    assert_eq!(fetched, DateKey::all().collect::<Vec<_>>());
    assert!(fetched.contains(&DateKey::new(2, 29).unwrap()));
}

#[tokio::test]
async fn second_run_without_overwrite_fetches_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);

    let first = StubSource::new(StubKind::Html);
    downloader(&first, &store, false).download_all(false).await.unwrap();
    assert_eq!(first.fetches(), 366);

    let second = StubSource::new(StubKind::Html);
    let report = downloader(&second, &store, false).download_all(false).await.unwrap();
    assert_eq!(second.fetches(), 0);
    assert_eq!(report.skipped, 366);
    assert_eq!(report.written, 0);
}

#[tokio::test]
async fn overwrite_refetches_every_date() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);

    let first = StubSource::new(StubKind::Html);
    downloader(&first, &store, false).download_all(false).await.unwrap();

    let second = StubSource::new(StubKind::Json);
    let report = downloader(&second, &store, false).download_all(true).await.unwrap();
    assert_eq!(second.fetches(), 366);
    assert_eq!(report.written, 366);

    // The JSON stub has a death and no births; the entry was replaced, not merged.
    let records = store.read(DateKey::new(7, 4).unwrap(), None).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.category != Category::Births));
}

#[tokio::test]
async fn failing_day_is_reported_and_others_continue() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let bad = [DateKey::new(3, 1).unwrap(), DateKey::new(12, 25).unwrap()];
    let source = StubSource::new(StubKind::Html).failing_on(&bad);

    let report = downloader(&source, &store, false).download_all(false).await.unwrap();
    assert!(!report.is_complete());
    assert_eq!(report.fetched, 366);
    assert_eq!(report.written, 364);
    let failed: Vec<DateKey> = report.failed.iter().map(|(d, _)| *d).collect();
    assert_eq!(failed, bad.to_vec());

    for date in bad {
        assert!(matches!(
            store.read(date, None).await,
            Err(OnThisDayError::CacheMiss(_))
        ));
    }

    // A retry run only touches the two missing days.
    let retry = StubSource::new(StubKind::Html);
    let report = downloader(&retry, &store, false).download_all(false).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(retry.fetched_dates(), bad.to_vec());
}

#[tokio::test]
async fn failed_refetch_keeps_previous_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let date = DateKey::new(1, 1).unwrap();
    let previous = vec![EventRecord::new(Category::Events, Some(1801), "Union takes effect").unwrap()];
    store.write(date, None, "seed", &previous, true).await.unwrap();

    let source = StubSource::new(StubKind::Html).failing_on(&[date]);
    let report = downloader(&source, &store, false).download_all(true).await.unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(store.read(date, None).await.unwrap(), previous);
}

#[tokio::test]
async fn strict_mode_aborts_on_first_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let bad = DateKey::new(1, 3).unwrap();
    let source = StubSource::new(StubKind::Html).failing_on(&[bad]);

    let err = downloader(&source, &store, true).download_all(false).await.unwrap_err();
    assert!(matches!(err, OnThisDayError::SourceUnavailable { .. }));
    assert_eq!(source.fetches(), 3);
    assert!(store.exists(DateKey::new(1, 2).unwrap(), None).await.unwrap());
    assert!(!store.exists(DateKey::new(1, 4).unwrap(), None).await.unwrap());
}

#[tokio::test]
async fn structural_change_is_a_per_day_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerDay);
    let source = StubSource::new(StubKind::BrokenHtml);

    let report = downloader(&source, &store, false).download_all(false).await.unwrap();
    assert_eq!(report.failed.len(), 366);
    assert_eq!(report.written, 0);
    assert!(report.failed[0].1.contains("Events"));
}

#[tokio::test]
async fn per_category_layout_download() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CacheStore::new(tmp.path(), Layout::PerCategory);
    let source = StubSource::new(StubKind::Html);

    let report = downloader(&source, &store, false).download_all(false).await.unwrap();
    assert_eq!(report.written, 366);

    let date = DateKey::new(7, 4).unwrap();
    assert_eq!(store.read(date, Some(Category::Events)).await.unwrap().len(), 2);
    assert_eq!(store.read(date, Some(Category::Births)).await.unwrap().len(), 1);
    assert!(store.read(date, Some(Category::Deaths)).await.unwrap().is_empty());
    assert!(store.read(date, None).await.is_err());

    let again = StubSource::new(StubKind::Html);
    downloader(&again, &store, false).download_all(false).await.unwrap();
    assert_eq!(again.fetches(), 0);
}

#[tokio::test]
async fn unreadable_cache_is_a_per_day_failure() {
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where the cache directory should be: every lookup fails.
    let root = tmp.path().join("not-a-dir");
    std::fs::write(&root, b"").unwrap();
    let store = CacheStore::new(&root, Layout::PerDay);
    let source = StubSource::new(StubKind::Html);

    let report = downloader(&source, &store, false).download_all(false).await.unwrap();
    assert_eq!(report.failed.len(), 366);
    assert_eq!(report.fetched, 0);
    assert_eq!(source.fetches(), 0);

    let err = downloader(&source, &store, true).download_all(false).await.unwrap_err();
    assert!(matches!(err, OnThisDayError::Io { .. }));
}

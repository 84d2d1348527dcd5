//! Point queries against the cache.
//!
//! A query names a date and a [`CategoryFilter`]. If the cache has nothing
//! for that date yet, the engine acquires it first (cache-fill-on-miss) and
//! then answers from the freshly written entry.

use crate::config::Config;
use crate::error::{OnThisDayError, Result};
use crate::models::{Category, CategoryFilter, DateKey, EventRecord};
use crate::pipeline::fetch_day;
use crate::sources::RemoteSource;
use crate::store::CacheStore;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct QueryEngine<S> {
    source: S,
    store: CacheStore,
    categories: Vec<Category>,
}

impl<S: RemoteSource> QueryEngine<S> {
    pub fn new(source: S, store: CacheStore, categories: Vec<Category>) -> Self {
        Self {
            source,
            store,
            categories,
        }
    }

    pub fn from_config(source: S, store: CacheStore, config: &Config) -> Self {
        Self::new(source, store, config.categories.clone())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every cached event for `date` that passes `filter`, in stored order.
    ///
    /// # Errors
    ///
    /// On a cache miss the day is fetched first; `SourceUnavailable` and
    /// `Parse` from that fetch propagate unchanged.
    #[instrument(level = "info", skip_all, fields(%date, %filter))]
    pub async fn get_events(&self, date: DateKey, filter: &CategoryFilter) -> Result<Vec<EventRecord>> {
        let records = self.day(date).await?;
        let filtered = filter.apply(records);
        debug!(count = filtered.len(), "Filtered events");
        Ok(filtered)
    }

    /// One event chosen uniformly at random from [`QueryEngine::get_events`].
    pub async fn get_random_event(&self, date: DateKey, filter: &CategoryFilter) -> Result<EventRecord> {
        let events = self.get_events(date, filter).await?;
        choose_event(&events, date, filter, &mut rand::rng())
    }

    /// Like [`QueryEngine::get_random_event`] with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// [`OnThisDayError::NoEventsFound`] when the filtered set is empty.
    pub async fn get_random_event_with<R: Rng + ?Sized>(
        &self,
        date: DateKey,
        filter: &CategoryFilter,
        rng: &mut R,
    ) -> Result<EventRecord> {
        let events = self.get_events(date, filter).await?;
        choose_event(&events, date, filter, rng)
    }

    /// Load a day, acquiring it first if the cache lacks it.
    async fn day(&self, date: DateKey) -> Result<Vec<EventRecord>> {
        if !self.store.has_day(date, &self.categories).await? {
            info!(%date, "Cache miss; fetching day");
            fetch_day(&self.source, &self.store, &self.categories, date, true).await?;
        }
        self.store.load_day(date, &self.categories).await
    }
}

fn choose_event<R: Rng + ?Sized>(
    events: &[EventRecord],
    date: DateKey,
    filter: &CategoryFilter,
    rng: &mut R,
) -> Result<EventRecord> {
    events
        .choose(rng)
        .cloned()
        .ok_or_else(|| OnThisDayError::NoEventsFound(format!("{date} ({filter})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_choose_from_single_element() {
        let date = DateKey::new(7, 4).unwrap();
        let only = vec![EventRecord::new(Category::Events, Some(1776), "Declaration").unwrap()];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = choose_event(&only, date, &CategoryFilter::All, &mut rng).unwrap();
            assert_eq!(picked, only[0]);
        }
    }

    #[test]
    fn test_choose_from_empty_is_no_events_found() {
        let date = DateKey::new(7, 4).unwrap();
        let err = choose_event(&[], date, &CategoryFilter::All, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, OnThisDayError::NoEventsFound(_)));
    }

    #[test]
    fn test_choose_covers_every_element() {
        let date = DateKey::new(1, 1).unwrap();
        let events: Vec<EventRecord> = (0..3)
            .map(|i| EventRecord::new(Category::Events, Some(2000 + i), "e").unwrap())
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let picked = choose_event(&events, date, &CategoryFilter::All, &mut rng).unwrap();
            seen[(picked.year.unwrap() - 2000) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}

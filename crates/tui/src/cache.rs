//! Per-view result caching.
//!
//! Each view owns exactly one slot, keyed by the query parameters that
//! produced its data. Entries are replaced wholesale, never patched, and a
//! confirmed transaction mutation clears every view that could contain the
//! affected row in one place (`ViewCache::invalidate_transactions`).

use std::collections::BTreeMap;
use std::future::Future;

use api_types::{keyword::KeywordEntry, search::SearchResponse, transaction::Transaction};

/// The most recent successful fetch of one view, plus the key of the most
/// recent *request*. A response that resolves after its key was superseded
/// is discarded instead of overwriting the newer request's slot.
#[derive(Debug)]
pub struct ViewSlot<T> {
    active_key: Option<String>,
    entry: Option<(String, T)>,
}

impl<T> Default for ViewSlot<T> {
    fn default() -> Self {
        Self {
            active_key: None,
            entry: None,
        }
    }
}

impl<T: Clone> ViewSlot<T> {
    /// Cache hit iff the stored entry was produced by exactly this key.
    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.entry
            .as_ref()
            .and_then(|(stored, data)| (stored == key).then_some(data))
    }

    /// Records the key a fetch is about to be issued for.
    pub fn begin(&mut self, key: &str) {
        self.active_key = Some(key.to_string());
    }

    /// Stores the fetched data, unless the view has moved on to another key
    /// in the meantime. Returns whether the response was kept.
    pub fn complete(&mut self, key: &str, data: T) -> bool {
        if self.active_key.as_deref() != Some(key) {
            tracing::debug!(key, "discarding response for superseded key");
            return false;
        }
        self.entry = Some((key.to_string(), data));
        true
    }

    /// Drops the entry. The next `get_or_fetch` for any key goes to the
    /// network. A fetch already in flight is unaffected and will still
    /// store its result (its key is still the active one).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns the cached data for `key`, or runs `fetch` and stores the
    /// result. A failed fetch leaves the previous entry untouched.
    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        key: &str,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(data) = self.lookup(key) {
            return Ok(data.clone());
        }
        self.begin(key);
        let data = fetch().await?;
        self.complete(key, data.clone());
        Ok(data)
    }
}

/// Search results are server-paged: under one filter key the slot holds a
/// `page -> response` map, so revisiting an already-fetched page is local
/// while a new page goes to the network with an updated `page` parameter.
/// Changing the filter drops every cached page.
#[derive(Debug, Default)]
pub struct SearchSlot {
    active_filter: Option<String>,
    filter: Option<String>,
    pages: BTreeMap<u32, SearchResponse>,
}

impl SearchSlot {
    pub fn lookup(&self, filter: &str, page: u32) -> Option<&SearchResponse> {
        if self.filter.as_deref() != Some(filter) {
            return None;
        }
        self.pages.get(&page)
    }

    pub fn begin(&mut self, filter: &str) {
        self.active_filter = Some(filter.to_string());
    }

    pub fn complete(&mut self, filter: &str, page: u32, response: SearchResponse) -> bool {
        if self.active_filter.as_deref() != Some(filter) {
            tracing::debug!(filter, "discarding search response for superseded filter");
            return false;
        }
        if self.filter.as_deref() != Some(filter) {
            self.filter = Some(filter.to_string());
            self.pages.clear();
        }
        self.pages.insert(page, response);
        true
    }

    pub fn invalidate(&mut self) {
        self.filter = None;
        self.pages.clear();
    }

    pub async fn get_or_fetch<F, Fut, E>(
        &mut self,
        filter: &str,
        page: u32,
        fetch: F,
    ) -> std::result::Result<SearchResponse, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<SearchResponse, E>>,
    {
        if let Some(response) = self.lookup(filter, page) {
            return Ok(response.clone());
        }
        self.begin(filter);
        let response = fetch().await?;
        self.complete(filter, page, response.clone());
        Ok(response)
    }
}

/// One slot per view. Owned by the app state; handlers only ever go through
/// `get_or_fetch` and the invalidation methods below.
#[derive(Debug, Default)]
pub struct ViewCache {
    pub daily: ViewSlot<Vec<Transaction>>,
    pub monthly: ViewSlot<Vec<Transaction>>,
    pub search: SearchSlot,
    pub keywords: ViewSlot<Vec<KeywordEntry>>,
}

impl ViewCache {
    /// A single transaction can appear in the daily, monthly and search
    /// views at once, so a confirmed transaction write clears all three,
    /// regardless of their current keys.
    pub fn invalidate_transactions(&mut self) {
        self.daily.invalidate();
        self.monthly.invalidate();
        self.search.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn search_page(page: u32, total_pages: u32) -> SearchResponse {
        SearchResponse {
            transactions: Vec::new(),
            total_transactions: u64::from(total_pages) * 10,
            total_pages,
            current_page: page,
        }
    }

    #[tokio::test]
    async fn second_fetch_with_same_key_is_served_from_cache() {
        let mut slot: ViewSlot<Vec<u32>> = ViewSlot::default();
        let calls = Cell::new(0u32);

        for _ in 0..2 {
            let data = slot
                .get_or_fetch("15/03/2024", || {
                    calls.set(calls.get() + 1);
                    async { Ok::<_, &str>(vec![1, 2]) }
                })
                .await
                .unwrap();
            assert_eq!(data, vec![1, 2]);
        }

        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn changing_the_key_refetches_and_replaces_the_entry() {
        let mut slot: ViewSlot<Vec<u32>> = ViewSlot::default();
        let calls = Cell::new(0u32);

        let mut fetch = |data: Vec<u32>| {
            calls.set(calls.get() + 1);
            async move { Ok::<_, &str>(data) }
        };

        slot.get_or_fetch("15/03/2024", || fetch(vec![1])).await.unwrap();
        slot.get_or_fetch("16/03/2024", || fetch(vec![2])).await.unwrap();
        assert_eq!(calls.get(), 2);

        // The old key's entry was replaced wholesale, not kept alongside.
        assert!(slot.lookup("15/03/2024").is_none());
        assert_eq!(slot.lookup("16/03/2024"), Some(&vec![2]));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_previous_entry_untouched() {
        let mut slot: ViewSlot<Vec<u32>> = ViewSlot::default();

        slot.get_or_fetch("a", || async { Ok::<_, &str>(vec![1]) })
            .await
            .unwrap();
        let err = slot
            .get_or_fetch("b", || async { Err::<Vec<u32>, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");

        assert_eq!(slot.lookup("a"), Some(&vec![1]));
        assert!(slot.lookup("b").is_none());
    }

    #[test]
    fn late_response_for_superseded_key_is_discarded() {
        let mut slot: ViewSlot<Vec<u32>> = ViewSlot::default();

        slot.begin("k1");
        slot.begin("k2");

        assert!(!slot.complete("k1", vec![1]));
        assert!(slot.lookup("k1").is_none());

        assert!(slot.complete("k2", vec![2]));
        assert_eq!(slot.lookup("k2"), Some(&vec![2]));
    }

    #[tokio::test]
    async fn mutation_invalidates_every_transaction_view_but_not_keywords() {
        let mut cache = ViewCache::default();
        let daily_calls = Cell::new(0u32);
        let monthly_calls = Cell::new(0u32);
        let search_calls = Cell::new(0u32);
        let keyword_calls = Cell::new(0u32);

        // Load every view, mutate, load again with the same keys: the
        // three transaction views must refetch, the keyword view must not.
        for round in 0..2 {
            cache
                .daily
                .get_or_fetch("15/03/2024", || {
                    daily_calls.set(daily_calls.get() + 1);
                    async { Ok::<_, &str>(Vec::new()) }
                })
                .await
                .unwrap();
            cache
                .monthly
                .get_or_fetch("2024-03", || {
                    monthly_calls.set(monthly_calls.get() + 1);
                    async { Ok::<_, &str>(Vec::new()) }
                })
                .await
                .unwrap();
            cache
                .search
                .get_or_fetch("2024-all-bar--", 1, || {
                    search_calls.set(search_calls.get() + 1);
                    async { Ok::<_, &str>(search_page(1, 1)) }
                })
                .await
                .unwrap();
            cache
                .keywords
                .get_or_fetch("all", || {
                    keyword_calls.set(keyword_calls.get() + 1);
                    async { Ok::<_, &str>(Vec::new()) }
                })
                .await
                .unwrap();

            if round == 0 {
                cache.invalidate_transactions();
            }
        }

        assert_eq!(daily_calls.get(), 2);
        assert_eq!(monthly_calls.get(), 2);
        assert_eq!(search_calls.get(), 2);
        // Keyword writes do not touch transactions and vice versa.
        assert_eq!(keyword_calls.get(), 1);
    }

    #[tokio::test]
    async fn add_transaction_round_trip_refetches_the_same_key() {
        let mut slot: ViewSlot<Vec<&str>> = ViewSlot::default();
        let calls = Cell::new(0u32);
        let key = "15/03/2024";

        let first = slot
            .get_or_fetch(key, || {
                calls.set(calls.get() + 1);
                async { Ok::<_, &str>(vec!["tx1", "tx2"]) }
            })
            .await
            .unwrap();
        assert_eq!(first, vec!["tx1", "tx2"]);

        let cached = slot
            .get_or_fetch(key, || {
                calls.set(calls.get() + 1);
                async { Ok::<_, &str>(Vec::new()) }
            })
            .await
            .unwrap();
        assert_eq!(cached, vec!["tx1", "tx2"]);
        assert_eq!(calls.get(), 1);

        // A write for this date confirmed: the slot must be dropped.
        slot.invalidate();

        let fresh = slot
            .get_or_fetch(key, || {
                calls.set(calls.get() + 1);
                async { Ok::<_, &str>(vec!["tx1", "tx2", "tx3"]) }
            })
            .await
            .unwrap();
        assert_eq!(fresh, vec!["tx1", "tx2", "tx3"]);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn search_pages_are_cached_per_filter_key() {
        let mut slot = SearchSlot::default();
        let calls = Cell::new(0u32);
        let filter = "2024-all-bar--";

        let mut fetch = |page: u32| {
            calls.set(calls.get() + 1);
            async move { Ok::<_, &str>(search_page(page, 4)) }
        };

        let page1 = slot.get_or_fetch(filter, 1, || fetch(1)).await.unwrap();
        assert_eq!(page1.total_pages, 4);
        assert_eq!(calls.get(), 1);

        // Page 2 is not in cache: one more call, with the new page number.
        let page2 = slot.get_or_fetch(filter, 2, || fetch(2)).await.unwrap();
        assert_eq!(page2.current_page, 2);
        assert_eq!(calls.get(), 2);

        // Page 1 is still held under the same filter: served locally.
        slot.get_or_fetch(filter, 1, || fetch(1)).await.unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn changing_the_search_filter_drops_cached_pages() {
        let mut slot = SearchSlot::default();
        let calls = Cell::new(0u32);

        let mut fetch = |page: u32| {
            calls.set(calls.get() + 1);
            async move { Ok::<_, &str>(search_page(page, 2)) }
        };

        slot.get_or_fetch("filter-a", 1, || fetch(1)).await.unwrap();
        slot.get_or_fetch("filter-b", 1, || fetch(1)).await.unwrap();
        assert_eq!(calls.get(), 2);

        // The old filter's pages are gone.
        assert!(slot.lookup("filter-a", 1).is_none());

        slot.get_or_fetch("filter-b", 1, || fetch(1)).await.unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn stale_search_response_for_old_filter_is_discarded() {
        let mut slot = SearchSlot::default();

        slot.begin("filter-a");
        slot.begin("filter-b");

        assert!(!slot.complete("filter-a", 1, search_page(1, 1)));
        assert!(slot.lookup("filter-a", 1).is_none());

        assert!(slot.complete("filter-b", 1, search_page(1, 1)));
        assert!(slot.lookup("filter-b", 1).is_some());
    }
}

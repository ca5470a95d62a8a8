use std::collections::{HashMap, HashSet};
use tabfeed_model::{
    domain_from_url, estimate_reading_minutes, is_internal_url, truncate_chars, Category, LiveTab,
    NamedEntities, ScrapePayload, TabItem, FULL_TEXT_CAP,
};

/// In-memory mapping from tab id to [`TabItem`]; the single source of
/// truth for the process's view of tab state.
///
/// Merge policy, applied by every mutation:
/// 1. `full_text` length never regresses.
/// 2. Presentation fields (`title`, `description`, `favicon_url`,
///    `hero_image_url`) only change when the incoming value is non-empty.
/// 3. `summary`/`categories`/`entities` are written only through their
///    pipeline's completion methods, never by the lifecycle-sync path.
/// 4. `updated_at` is bumped on every merge; `first_seen` is set once.
#[derive(Debug, Default)]
pub struct TabStore {
    items: HashMap<i64, TabItem>,
}

impl TabStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents from a hydrated snapshot. Internal-URL
    /// items are dropped on the way in; they should never have been
    /// persisted.
    pub fn seed(&mut self, items: Vec<TabItem>) {
        self.items.clear();
        for item in items {
            if item.url.is_empty() || is_internal_url(&item.url) {
                continue;
            }
            self.items.insert(item.tab_id, item);
        }
    }

    #[must_use]
    pub fn get(&self, tab_id: i64) -> Option<&TabItem> {
        self.items.get(&tab_id)
    }

    #[must_use]
    pub fn contains(&self, tab_id: i64) -> bool {
        self.items.contains_key(&tab_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> HashSet<i64> {
        self.items.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabItem> {
        self.items.values()
    }

    /// Fold host-reported lifecycle facts into the store. Creates the
    /// item on first observation. Returns `false` without mutating when
    /// the tab belongs to an internal surface.
    pub fn upsert_live(&mut self, live: &LiveTab, now: u64) -> bool {
        if live.url.is_empty() || is_internal_url(&live.url) {
            return false;
        }
        let item = self
            .items
            .entry(live.id)
            .or_insert_with(|| TabItem::new(live.id, live.window_id, live.index, &live.url, now));
        item.window_id = live.window_id;
        item.ordinal_index = live.index;
        if item.url != live.url {
            item.url = live.url.clone();
            item.domain = domain_from_url(&live.url);
        }
        merge_non_empty(&mut item.title, &live.title);
        merge_non_empty(&mut item.favicon_url, &live.favicon_url);
        item.pinned = live.pinned;
        item.audible = live.audible;
        item.updated_at = now;
        true
    }

    /// Fold a scraped page payload into the store. Creates the item if
    /// the tab has not been seen through the lifecycle path yet; window
    /// and ordinal placement stay placeholders until the next reconcile.
    ///
    /// Returns `true` when `full_text` grew, which is the signal that
    /// enrichment signatures may have changed.
    pub fn apply_scrape(&mut self, payload: &ScrapePayload, now: u64) -> Option<bool> {
        if payload.url.is_empty() || is_internal_url(&payload.url) {
            return None;
        }
        let item = self
            .items
            .entry(payload.tab_id)
            .or_insert_with(|| TabItem::new(payload.tab_id, 0, i32::MAX, &payload.url, now));
        if item.url != payload.url {
            item.url = payload.url.clone();
            item.domain = domain_from_url(&payload.url);
        }
        if !payload.domain.is_empty() {
            item.domain = payload.domain.clone();
        }
        merge_non_empty(&mut item.title, &payload.title);
        merge_non_empty(&mut item.description, &payload.description);
        merge_non_empty(&mut item.favicon_url, &payload.favicon_url);
        merge_non_empty(&mut item.hero_image_url, &payload.hero_image_url);

        let incoming = truncate_chars(&payload.full_text, FULL_TEXT_CAP);
        let grew = incoming.len() > item.full_text.len();
        if grew {
            item.full_text = incoming.to_string();
            item.reading_minutes = Some(estimate_reading_minutes(&item.full_text));
        }
        item.updated_at = now;
        Some(grew)
    }

    /// Reposition a tab after a host move event. A no-op for unknown ids;
    /// the next reconcile carries the authoritative placement anyway.
    pub fn apply_move(&mut self, tab_id: i64, window_id: i64, to_index: i32, now: u64) -> bool {
        let Some(item) = self.items.get_mut(&tab_id) else {
            return false;
        };
        item.window_id = window_id;
        item.ordinal_index = to_index;
        item.updated_at = now;
        true
    }

    /// Completion path for the summarize pipeline. A no-op when the tab
    /// was removed while the job was in flight.
    pub fn set_summary(&mut self, tab_id: i64, summary: String, now: u64) -> bool {
        let Some(item) = self.items.get_mut(&tab_id) else {
            return false;
        };
        item.summary = Some(summary);
        item.updated_at = now;
        true
    }

    /// Completion path for the classify pipeline.
    pub fn set_categories(&mut self, tab_id: i64, categories: Vec<Category>, now: u64) -> bool {
        let Some(item) = self.items.get_mut(&tab_id) else {
            return false;
        };
        item.categories = categories;
        item.updated_at = now;
        true
    }

    /// Completion path for the entity-extraction pipeline.
    pub fn set_entities(&mut self, tab_id: i64, entities: NamedEntities, now: u64) -> bool {
        let Some(item) = self.items.get_mut(&tab_id) else {
            return false;
        };
        item.entities = entities;
        item.updated_at = now;
        true
    }

    /// Accept an externally-computed reading-time estimate, only when no
    /// estimate exists yet.
    pub fn set_reading_minutes(&mut self, tab_id: i64, minutes: u32, now: u64) -> bool {
        let Some(item) = self.items.get_mut(&tab_id) else {
            return false;
        };
        if item.reading_minutes.is_some() {
            return false;
        }
        item.reading_minutes = Some(minutes);
        item.updated_at = now;
        true
    }

    pub fn remove(&mut self, tab_id: i64) -> Option<TabItem> {
        self.items.remove(&tab_id)
    }

    /// Hard-delete every item whose id is absent from `live_ids`.
    /// Returns the removed ids so callers can drop per-tab side state
    /// (signature caches, request logs).
    pub fn retain_live(&mut self, live_ids: &HashSet<i64>) -> Vec<i64> {
        let stale: Vec<i64> = self
            .items
            .keys()
            .copied()
            .filter(|id| !live_ids.contains(id))
            .collect();
        for id in &stale {
            self.items.remove(id);
        }
        stale
    }

    /// The user-visible list: pinned tabs first, then window id
    /// ascending, then ordinal index ascending. The sort is stable, so
    /// items with fully equal keys keep their relative order.
    #[must_use]
    pub fn sorted_for_display(&self) -> Vec<TabItem> {
        let mut out: Vec<TabItem> = self
            .items
            .values()
            .filter(|item| !item.url.is_empty() && !is_internal_url(&item.url))
            .cloned()
            .collect();
        out.sort_by_key(|item| (!item.pinned, item.window_id, item.ordinal_index));
        out
    }
}

fn merge_non_empty(dst: &mut String, src: &str) {
    if !src.is_empty() {
        *dst = src.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn live(id: i64, window_id: i64, index: i32, url: &str, title: &str) -> LiveTab {
        LiveTab {
            id,
            window_id,
            index,
            url: url.to_string(),
            title: title.to_string(),
            favicon_url: String::new(),
            pinned: false,
            audible: false,
        }
    }

    fn scrape(tab_id: i64, url: &str, full_text: &str) -> ScrapePayload {
        ScrapePayload {
            tab_id,
            url: url.to_string(),
            full_text: full_text.to_string(),
            ..ScrapePayload::default()
        }
    }

    #[test]
    fn full_text_length_is_monotone() {
        let mut store = TabStore::new();
        store.upsert_live(&live(1, 1, 0, "https://a.example/", "A"), 10);
        assert_eq!(
            store.apply_scrape(&scrape(1, "https://a.example/", "a long body of text"), 20),
            Some(true)
        );
        // A late partial scrape must not erase the good one.
        assert_eq!(
            store.apply_scrape(&scrape(1, "https://a.example/", "short"), 30),
            Some(false)
        );
        assert_eq!(store.get(1).unwrap().full_text, "a long body of text");
        assert_eq!(store.get(1).unwrap().updated_at, 30);
    }

    #[test]
    fn empty_fields_never_clear_known_values() {
        let mut store = TabStore::new();
        let mut payload = scrape(1, "https://a.example/", "body text");
        payload.title = "Good Title".to_string();
        payload.description = "desc".to_string();
        payload.favicon_url = "https://a.example/icon.png".to_string();
        store.apply_scrape(&payload, 10);

        store.upsert_live(&live(1, 1, 0, "https://a.example/", ""), 20);
        store.apply_scrape(&scrape(1, "https://a.example/", ""), 30);

        let item = store.get(1).unwrap();
        assert_eq!(item.title, "Good Title");
        assert_eq!(item.description, "desc");
        assert_eq!(item.favicon_url, "https://a.example/icon.png");
    }

    #[test]
    fn first_seen_is_write_once() {
        let mut store = TabStore::new();
        store.upsert_live(&live(1, 1, 0, "https://a.example/", "A"), 10);
        store.upsert_live(&live(1, 1, 2, "https://a.example/", "A"), 50);
        let item = store.get(1).unwrap();
        assert_eq!(item.first_seen, 10);
        assert_eq!(item.updated_at, 50);
        assert_eq!(item.ordinal_index, 2);
    }

    #[test]
    fn internal_urls_are_rejected() {
        let mut store = TabStore::new();
        assert!(!store.upsert_live(&live(1, 1, 0, "chrome://settings", "Settings"), 10));
        assert_eq!(store.apply_scrape(&scrape(2, "chrome-extension://x/p.html", "text"), 10), None);
        assert!(store.is_empty());
    }

    #[test]
    fn scrape_first_creates_placeholder_item() {
        let mut store = TabStore::new();
        store.apply_scrape(&scrape(9, "https://b.example/", "hello world text"), 10);
        let item = store.get(9).unwrap();
        assert_eq!(item.ordinal_index, i32::MAX);
        assert_eq!(item.domain, "b.example");
        assert_eq!(item.reading_minutes, Some(1));
    }

    #[test]
    fn navigation_refreshes_domain() {
        let mut store = TabStore::new();
        store.upsert_live(&live(1, 1, 0, "https://www.a.example/", "A"), 10);
        assert_eq!(store.get(1).unwrap().domain, "a.example");
        store.upsert_live(&live(1, 1, 0, "https://b.example/post", "B"), 20);
        assert_eq!(store.get(1).unwrap().domain, "b.example");
    }

    #[test]
    fn retain_live_prunes_exactly_the_stale_set() {
        let mut store = TabStore::new();
        for id in 1..=4 {
            store.upsert_live(&live(id, 1, id as i32, &format!("https://{id}.example/"), "t"), 10);
        }
        let live_ids: HashSet<i64> = [2, 4, 5].into_iter().collect();
        let mut removed = store.retain_live(&live_ids);
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(store.ids(), [2, 4].into_iter().collect());
    }

    #[test]
    fn display_order_is_pinned_then_window_then_index() {
        let mut store = TabStore::new();
        let mut a = live(1, 2, 0, "https://a.example/", "A");
        a.pinned = true;
        let b = live(2, 1, 5, "https://b.example/", "B");
        let mut c = live(3, 1, 1, "https://c.example/", "C");
        c.pinned = true;
        store.upsert_live(&a, 10);
        store.upsert_live(&b, 10);
        store.upsert_live(&c, 10);

        let order: Vec<i64> = store.sorted_for_display().iter().map(|i| i.tab_id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn enrichment_setters_are_noops_for_removed_tabs() {
        let mut store = TabStore::new();
        assert!(!store.set_summary(42, "gone".to_string(), 10));
        assert!(!store.set_categories(42, vec![Category::News], 10));
        assert!(!store.set_entities(42, NamedEntities::default(), 10));
    }

    #[test]
    fn reading_minutes_from_host_only_fills_gaps() {
        let mut store = TabStore::new();
        store.upsert_live(&live(1, 1, 0, "https://a.example/", "A"), 10);
        assert!(store.set_reading_minutes(1, 4, 20));
        assert!(!store.set_reading_minutes(1, 9, 30));
        assert_eq!(store.get(1).unwrap().reading_minutes, Some(4));
    }

    #[test]
    fn full_text_is_capped() {
        let mut store = TabStore::new();
        let long = "x".repeat(FULL_TEXT_CAP + 500);
        store.apply_scrape(&scrape(1, "https://a.example/", &long), 10);
        assert_eq!(store.get(1).unwrap().full_text.len(), FULL_TEXT_CAP);
    }
}

//! # Tab Feed Model
//!
//! Shared data types for the tab index: the per-tab record, bundles,
//! suggestions, host-boundary payloads, and the closed category enum.
//!
//! Everything here is plain data. Merge rules live in `tabfeed-store`,
//! derived-field production in `tabfeed-enrich`.

mod bundle;
mod category;
mod host;
mod item;

pub use bundle::{
    Bundle, ChatEntry, SuggestedBundle, Tip, MAX_BUNDLE_TIPS, MIN_SUGGESTED_BUNDLE_TABS,
};
pub use category::{Category, MAX_CATEGORIES};
pub use host::{LiveTab, ScrapePayload};
pub use item::{domain_from_url, estimate_reading_minutes, NamedEntities, TabItem};

/// Minimum extracted-text length before enrichment or clustering is
/// attempted. Shorter pages are boilerplate more often than not.
pub const MIN_CONTENT_LEN: usize = 120;

/// Hard cap on stored `full_text` length, in characters.
pub const FULL_TEXT_CAP: usize = 20_000;

/// URL prefixes of browser-internal surfaces. Tabs behind these never
/// enter the store.
pub const INTERNAL_URL_PREFIXES: [&str; 6] = [
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "devtools://",
    "view-source:",
];

#[must_use]
pub fn is_internal_url(url: &str) -> bool {
    INTERNAL_URL_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Current wall-clock time as unix epoch milliseconds.
#[must_use]
pub fn now_unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}

/// Truncate to at most `max` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_urls_are_detected() {
        assert!(is_internal_url("chrome://settings"));
        assert!(is_internal_url("chrome-extension://abcdef/panel.html"));
        assert!(is_internal_url("about:blank"));
        assert!(!is_internal_url("https://example.com/chrome://fake"));
        assert!(!is_internal_url("https://a.example/"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 4), "");
    }
}

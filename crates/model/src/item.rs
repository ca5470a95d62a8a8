use crate::category::Category;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Named entities extracted from a tab's text. Each list holds at most
/// six short strings; the extraction pipeline enforces the cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NamedEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub orgs: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
}

impl NamedEntities {
    pub const MAX_PER_KIND: usize = 6;

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.orgs.is_empty() && self.places.is_empty()
    }

    /// Trim, drop empties, and cap each list at [`Self::MAX_PER_KIND`].
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(list: Vec<String>) -> Vec<String> {
            list.into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(NamedEntities::MAX_PER_KIND)
                .collect()
        }
        Self {
            people: clean(self.people),
            orgs: clean(self.orgs),
            places: clean(self.places),
        }
    }
}

/// One open tab as tracked by the store. `tab_id` is assigned by the
/// host and unique across the store at any instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TabItem {
    pub tab_id: i64,
    pub window_id: i64,
    pub ordinal_index: i32,
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub hero_image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub entities: NamedEntities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_minutes: Option<u32>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub audible: bool,
    pub first_seen: u64,
    pub updated_at: u64,
}

impl TabItem {
    /// A bare record for a tab observed for the first time at `now`.
    #[must_use]
    pub fn new(tab_id: i64, window_id: i64, ordinal_index: i32, url: &str, now: u64) -> Self {
        Self {
            tab_id,
            window_id,
            ordinal_index,
            url: url.to_string(),
            domain: domain_from_url(url),
            title: String::new(),
            favicon_url: String::new(),
            hero_image_url: String::new(),
            description: String::new(),
            full_text: String::new(),
            summary: None,
            categories: Vec::new(),
            entities: NamedEntities::default(),
            reading_minutes: None,
            pinned: false,
            audible: false,
            first_seen: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn has_min_content(&self) -> bool {
        self.full_text.len() >= crate::MIN_CONTENT_LEN
    }
}

/// Registrable host of `url` with a leading `www.` stripped. Empty for
/// unparseable or host-less URLs.
#[must_use]
pub fn domain_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Reading-time estimate at roughly 220 words per minute, floored at one
/// minute for any non-empty text.
#[must_use]
pub fn estimate_reading_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / 220.0).round() as u32;
    minutes.max(1)
}

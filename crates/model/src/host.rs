use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One tab as reported by the host's authoritative tab listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiveTab {
    pub id: i64,
    pub window_id: i64,
    pub index: i32,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub audible: bool,
}

/// Page metadata and body text pushed by the content collaborator.
/// Arrives at unpredictable times: page load, SPA navigation, or an
/// explicit re-scrape request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScrapePayload {
    pub tab_id: i64,
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub hero_image_url: String,
    #[serde(default)]
    pub full_text: String,
}

use crate::item::TabItem;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Auto-suggested groupings below this member count are never surfaced.
pub const MIN_SUGGESTED_BUNDLE_TABS: usize = 3;

/// Upper bound on stored action tips per bundle.
pub const MAX_BUNDLE_TIPS: usize = 6;

/// One actionable follow-up link attached to a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tip {
    pub label: String,
    pub url: String,
}

/// One question/answer exchange in a bundle's chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatEntry {
    pub question: String,
    pub answer: String,
    pub asked_at: u64,
}

/// A user- or suggestion-created grouping of tabs.
///
/// `tab_ids` may reference tabs that have since been closed; once the
/// bundle is archived, the `items` snapshot is authoritative for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bundle {
    pub id: String,
    pub title: String,
    pub tab_ids: Vec<i64>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tips: Vec<Tip>,
    #[serde(default)]
    pub chat: Vec<ChatEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TabItem>>,
    #[serde(default)]
    pub archived: bool,
}

/// An ephemeral clustering proposal. Regenerated wholesale on each pass
/// and replaced, never merged with the previous set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestedBundle {
    pub title: String,
    pub tab_ids: Vec<i64>,
}

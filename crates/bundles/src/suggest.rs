use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tabfeed_capability::{parse_structured, Capability};
use tabfeed_model::{SuggestedBundle, TabItem, MIN_SUGGESTED_BUNDLE_TABS};

const CLUSTER_INSTRUCTION: &str =
    "Group the listed tabs into thematic bundles of related work. \
     Only propose groups of 3 or more tabs. Do not propose a group \
     whose theme duplicates one of the existing bundle titles. \
     Output a STRICT JSON array, no commentary. \
     Schema: [{\"title\": string, \"tab_ids\": [number]}].";

/// Clustering proposal as emitted by the capability, before filtering.
#[derive(Debug, Deserialize)]
pub struct RawProposal {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tab_ids: Vec<i64>,
}

/// Tabs with enough extracted text to carry a clustering signal.
#[must_use]
pub fn eligible_items<'a>(items: &'a [TabItem]) -> Vec<&'a TabItem> {
    items.iter().filter(|item| item.has_min_content()).collect()
}

/// Enforce the hard constraints clustering output must satisfy: a
/// non-empty title, at least [`MIN_SUGGESTED_BUNDLE_TABS`] members, and
/// members that still exist in the store. Title similarity to existing
/// bundles stays a prompt-side soft constraint.
#[must_use]
pub fn filter_proposals(raw: Vec<RawProposal>, live_ids: &HashSet<i64>) -> Vec<SuggestedBundle> {
    raw.into_iter()
        .filter_map(|proposal| {
            let title = proposal.title.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let mut seen = HashSet::new();
            let tab_ids: Vec<i64> = proposal
                .tab_ids
                .into_iter()
                .filter(|id| live_ids.contains(id) && seen.insert(*id))
                .collect();
            if tab_ids.len() < MIN_SUGGESTED_BUNDLE_TABS {
                return None;
            }
            Some(SuggestedBundle { title, tab_ids })
        })
        .collect()
}

/// One clustering pass. Returns `None` when the capability fails or the
/// response is unparseable; the caller keeps the previous suggestion
/// set in that case, and replaces it wholesale otherwise.
pub async fn propose_bundles(
    capability: &Capability,
    items: &[TabItem],
    existing_titles: &[String],
    timeout: Duration,
) -> Option<Vec<SuggestedBundle>> {
    let eligible = eligible_items(items);
    let live_ids: HashSet<i64> = eligible.iter().map(|item| item.tab_id).collect();

    let mut input = String::from("Open tabs:\n");
    for item in &eligible {
        input.push_str(&format!(
            "- id={} title={:?} description={:?} categories={:?}\n",
            item.tab_id,
            item.title,
            item.description,
            item.categories
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
        ));
    }
    if !existing_titles.is_empty() {
        input.push_str("\nExisting bundle titles:\n");
        for title in existing_titles {
            input.push_str(&format!("- {title}\n"));
        }
    }

    let raw = match capability.generate(CLUSTER_INSTRUCTION, &input, timeout).await {
        Ok(raw) => raw,
        Err(err) => {
            debug!("clustering pass failed: {err}");
            return None;
        }
    };
    let proposals = parse_structured::<Vec<RawProposal>>(&raw)?;
    Some(filter_proposals(proposals, &live_ids))
}

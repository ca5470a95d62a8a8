use crate::pipeline::{EnrichmentResult, PipelineKind};
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use tabfeed_capability::{parse_structured, Capability};
use tabfeed_model::{truncate_chars, Category, NamedEntities, TabItem};
use tokio::task::JoinSet;

/// Knobs shared by the three executors.
#[derive(Debug, Clone, Copy)]
pub struct EnrichConfig {
    /// Prefix of `full_text` handed to the summarizer, in chars.
    pub summary_input_cap: usize,
    pub summarize_timeout: Duration,
    /// Timeout for the structured classify/entities calls.
    pub label_timeout: Duration,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            summary_input_cap: 4_000,
            summarize_timeout: Duration::from_secs(12),
            label_timeout: Duration::from_secs(6),
        }
    }
}

const SUMMARIZE_INSTRUCTION: &str =
    "Summarize the following page text as 3-5 concise markdown bullet points. \
     Output only the bullet list.";

const CLASSIFY_INSTRUCTION: &str =
    "Classify the page into 1-3 of these categories: News, Technology, \
     Developer Docs, Research, Video, Social, Shopping, Entertainment, \
     Finance, Sports, Productivity, Other. \
     Output a STRICT JSON array of category strings, no commentary.";

const ENTITIES_INSTRUCTION: &str =
    "Extract the named entities mentioned in the page text. \
     Output STRICT JSON: {\"people\":[],\"orgs\":[],\"places\":[]}, \
     at most 6 short strings per list, no commentary.";

/// Produce a short markdown summary, or `None` on any failure.
pub async fn summarize(
    capability: &Capability,
    item: &TabItem,
    config: &EnrichConfig,
) -> Option<String> {
    let input = format!(
        "Title: {}\nURL: {}\n\n{}",
        item.title,
        item.url,
        truncate_chars(&item.full_text, config.summary_input_cap)
    );
    match capability
        .generate(SUMMARIZE_INSTRUCTION, &input, config.summarize_timeout)
        .await
    {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(err) => {
            debug!("summarize failed for tab {}: {err}", item.tab_id);
            None
        }
    }
}

#[derive(Deserialize)]
struct CategoryObject {
    #[serde(default)]
    categories: Vec<String>,
}

/// Classify into the closed category enum, or `None` on any failure.
/// A successful call that yields no valid label normalizes to `Other`.
pub async fn classify(
    capability: &Capability,
    item: &TabItem,
    config: &EnrichConfig,
) -> Option<Vec<Category>> {
    let input = format!(
        "Title: {}\nURL: {}\nDescription: {}\n\n{}",
        item.title,
        item.url,
        item.description,
        truncate_chars(&item.full_text, 1_000)
    );
    let raw = match capability
        .generate(CLASSIFY_INSTRUCTION, &input, config.label_timeout)
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            debug!("classify failed for tab {}: {err}", item.tab_id);
            return None;
        }
    };
    let labels = parse_structured::<Vec<String>>(&raw)
        .or_else(|| parse_structured::<CategoryObject>(&raw).map(|o| o.categories))?;
    Some(Category::normalize_labels(&labels))
}

/// Extract people/orgs/places, or `None` on any failure. Missing or
/// malformed lists normalize to empty.
pub async fn extract_entities(
    capability: &Capability,
    item: &TabItem,
    config: &EnrichConfig,
) -> Option<NamedEntities> {
    let input = format!(
        "Title: {}\n\n{}",
        item.title,
        truncate_chars(&item.full_text, 2_000)
    );
    let raw = match capability
        .generate(ENTITIES_INSTRUCTION, &input, config.label_timeout)
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            debug!("entity extraction failed for tab {}: {err}", item.tab_id);
            return None;
        }
    };
    parse_structured::<NamedEntities>(&raw).map(NamedEntities::normalized)
}

/// Run one batch concurrently (fan-out/fan-in). Each job fails in
/// isolation; a failure surfaces as [`EnrichmentResult::Failed`] so the
/// engine can count it without touching the tab's fields.
pub async fn run_batch(
    capability: Capability,
    kind: PipelineKind,
    items: Vec<TabItem>,
    config: EnrichConfig,
) -> Vec<(i64, EnrichmentResult)> {
    let mut set = JoinSet::new();
    for item in items {
        let capability = capability.clone();
        set.spawn(async move {
            let result = match kind {
                PipelineKind::Summarize => summarize(&capability, &item, &config)
                    .await
                    .map(EnrichmentResult::Summary),
                PipelineKind::Classify => classify(&capability, &item, &config)
                    .await
                    .map(EnrichmentResult::Categories),
                PipelineKind::Entities => extract_entities(&capability, &item, &config)
                    .await
                    .map(EnrichmentResult::Entities),
            };
            (item.tab_id, result.unwrap_or(EnrichmentResult::Failed))
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(entry) => results.push(entry),
            Err(err) => debug!("{} job panicked: {err}", kind.as_str()),
        }
    }
    results
}

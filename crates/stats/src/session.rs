use crate::context::context_score;
use crate::request_log::RequestLog;
use std::collections::HashMap;
use tabfeed_model::{is_internal_url, TabItem};

const TOP_DOMAINS: usize = 10;
const TOP_HOT_TABS: usize = 5;

/// Fixed heuristic, not a measurement: browser baseline plus a linear
/// per-tab constant.
const MEMORY_BASE_MB: u64 = 120;
const MEMORY_PER_TAB_MB: u64 = 85;

/// TLDs that combine with a singleton domain into a "risky" flag.
const RISKY_TLDS: [&str; 8] = ["zip", "mov", "tk", "top", "gq", "ml", "cf", "click"];

/// Domains flagged regardless of TLD or count.
const DOMAIN_BLOCKLIST: [&str; 3] = ["example-phish.test", "login-verify.top", "free-prizes.click"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HotTab {
    pub tab_id: i64,
    pub title: String,
    pub count_1m: usize,
}

/// Session-level aggregates, recomputed from scratch per trigger.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SessionStats {
    pub open_tabs: usize,
    pub unique_domains: usize,
    pub domains_top: Vec<DomainCount>,
    pub memory_estimate_mb: u64,
    pub hot: Vec<HotTab>,
    pub context_score: u32,
    pub insecure_tabs: usize,
    pub tabs_with_trackers: usize,
    pub risky_domains: Vec<String>,
    pub categories: HashMap<String, usize>,
}

/// Derive the full stat set from the current tab list and request log.
/// Reads only; neither input is mutated.
#[must_use]
pub fn compute_session_stats(items: &[TabItem], log: &RequestLog, now: u64) -> SessionStats {
    let visible: Vec<&TabItem> = items
        .iter()
        .filter(|item| !item.url.is_empty() && !is_internal_url(&item.url))
        .collect();

    let mut domain_counts: HashMap<&str, usize> = HashMap::new();
    for item in &visible {
        if !item.domain.is_empty() {
            *domain_counts.entry(item.domain.as_str()).or_insert(0) += 1;
        }
    }

    let mut domains_top: Vec<DomainCount> = domain_counts
        .iter()
        .map(|(domain, count)| DomainCount {
            domain: (*domain).to_string(),
            count: *count,
        })
        .collect();
    domains_top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    domains_top.truncate(TOP_DOMAINS);

    let mut hot: Vec<HotTab> = visible
        .iter()
        .map(|item| HotTab {
            tab_id: item.tab_id,
            title: item.title.clone(),
            count_1m: log.counts(item.tab_id, now).last_60s,
        })
        .filter(|tab| tab.count_1m > 0)
        .collect();
    hot.sort_by(|a, b| b.count_1m.cmp(&a.count_1m).then_with(|| a.tab_id.cmp(&b.tab_id)));
    hot.truncate(TOP_HOT_TABS);

    let insecure_tabs = visible
        .iter()
        .filter(|item| item.url.starts_with("http://"))
        .count();

    let tabs_with_trackers = visible
        .iter()
        .filter(|item| log.has_trackers(item.tab_id, now))
        .count();

    let mut risky_domains: Vec<String> = domain_counts
        .iter()
        .filter(|(domain, count)| is_risky_domain(domain, **count))
        .map(|(domain, _)| (*domain).to_string())
        .collect();
    risky_domains.sort();

    let mut categories: HashMap<String, usize> = HashMap::new();
    for item in &visible {
        for category in &item.categories {
            *categories.entry(category.label().to_string()).or_insert(0) += 1;
        }
    }

    let owned: Vec<TabItem> = visible.iter().map(|item| (*item).clone()).collect();

    SessionStats {
        open_tabs: visible.len(),
        unique_domains: domain_counts.len(),
        domains_top,
        memory_estimate_mb: MEMORY_BASE_MB + MEMORY_PER_TAB_MB * visible.len() as u64,
        hot,
        context_score: context_score(&owned),
        insecure_tabs,
        tabs_with_trackers,
        risky_domains,
        categories,
    }
}

/// Risky: blocklisted outright, or a domain seen exactly once whose TLD
/// is in the risk list.
fn is_risky_domain(domain: &str, count: usize) -> bool {
    if DOMAIN_BLOCKLIST.contains(&domain) {
        return true;
    }
    if count != 1 {
        return false;
    }
    domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| RISKY_TLDS.contains(&tld))
}

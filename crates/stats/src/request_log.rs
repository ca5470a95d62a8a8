use std::collections::HashMap;
use std::collections::VecDeque;

/// Observations older than this are pruned.
pub const ROLLING_WINDOW_MS: u64 = 120_000;

const HOT_WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy)]
struct Observation {
    at_ms: u64,
    third_party: bool,
    tracker: bool,
}

#[derive(Debug, Default)]
struct TabRequests {
    events: VecDeque<Observation>,
    mixed_content: bool,
}

/// Derived counts for one tab over the rolling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct RequestCounts {
    pub third_party: usize,
    pub trackers: usize,
    pub last_60s: usize,
    pub requests_per_minute: f32,
    pub mixed_content: bool,
}

/// Rolling (≤120 s) per-tab window of network-event observations.
/// Purely additive/decaying; not part of the tab item itself.
#[derive(Debug, Default)]
pub struct RequestLog {
    per_tab: HashMap<i64, TabRequests>,
}

impl RequestLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tab_id: i64, now: u64, third_party: bool, tracker: bool) {
        let entry = self.per_tab.entry(tab_id).or_default();
        entry.events.push_back(Observation {
            at_ms: now,
            third_party,
            tracker,
        });
        Self::prune_tab(entry, now);
    }

    pub fn mark_mixed_content(&mut self, tab_id: i64) {
        self.per_tab.entry(tab_id).or_default().mixed_content = true;
    }

    /// Drop all state for a closed tab.
    pub fn forget(&mut self, tab_id: i64) {
        self.per_tab.remove(&tab_id);
    }

    #[must_use]
    pub fn counts(&self, tab_id: i64, now: u64) -> RequestCounts {
        let Some(entry) = self.per_tab.get(&tab_id) else {
            return RequestCounts::default();
        };
        let cutoff = now.saturating_sub(ROLLING_WINDOW_MS);
        let hot_cutoff = now.saturating_sub(HOT_WINDOW_MS);
        let mut counts = RequestCounts {
            mixed_content: entry.mixed_content,
            ..RequestCounts::default()
        };
        let mut in_window = 0usize;
        for obs in &entry.events {
            if obs.at_ms < cutoff {
                continue;
            }
            in_window += 1;
            if obs.third_party {
                counts.third_party += 1;
            }
            if obs.tracker {
                counts.trackers += 1;
            }
            if obs.at_ms >= hot_cutoff {
                counts.last_60s += 1;
            }
        }
        counts.requests_per_minute = in_window as f32 / (ROLLING_WINDOW_MS as f32 / 60_000.0);
        counts
    }

    #[must_use]
    pub fn has_trackers(&self, tab_id: i64, now: u64) -> bool {
        self.counts(tab_id, now).trackers > 0
    }

    fn prune_tab(entry: &mut TabRequests, now: u64) {
        let cutoff = now.saturating_sub(ROLLING_WINDOW_MS);
        while entry
            .events
            .front()
            .is_some_and(|obs| obs.at_ms < cutoff)
        {
            entry.events.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn window_decays_old_observations() {
        let mut log = RequestLog::new();
        log.record(1, 1_000, true, true);
        log.record(1, 150_000, false, false);

        let counts = log.counts(1, 150_000);
        // the t=1000 event fell out of the 120s window
        assert_eq!(counts.trackers, 0);
        assert_eq!(counts.third_party, 0);
        assert_eq!(counts.last_60s, 1);
    }

    #[test]
    fn hot_window_is_sixty_seconds() {
        let mut log = RequestLog::new();
        log.record(1, 10_000, false, false);
        log.record(1, 80_000, false, false);
        log.record(1, 90_000, false, false);

        let counts = log.counts(1, 100_000);
        assert_eq!(counts.last_60s, 2);
    }

    #[test]
    fn mixed_content_is_sticky_until_forget() {
        let mut log = RequestLog::new();
        log.mark_mixed_content(1);
        assert!(log.counts(1, 500_000).mixed_content);
        log.forget(1);
        assert!(!log.counts(1, 500_000).mixed_content);
    }

    #[test]
    fn unknown_tab_has_default_counts() {
        let log = RequestLog::new();
        assert_eq!(log.counts(99, 1_000), RequestCounts::default());
    }
}

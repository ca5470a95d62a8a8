use std::time::Duration;
use tabfeed_enrich::EnrichConfig;

/// Engine timing and sizing knobs. The defaults are the production
/// values; tests shrink them to keep paused-clock runs tight.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Quiet period coalescing structural tab events (create, update,
    /// move, remove) into one full resync + broadcast.
    pub structural_debounce: Duration,
    /// Upper bound on how long a continuous structural event stream can
    /// defer the resync.
    pub structural_max_batch: Duration,

    /// Quiet period coalescing content changes (scrapes, enrichment
    /// completions) into one persist + notify, without a host resync.
    pub content_debounce: Duration,
    pub content_max_batch: Duration,

    /// Quiet period before a clustering pass over the current tab set.
    pub suggest_debounce: Duration,
    pub suggest_max_batch: Duration,

    /// Quiet period before session stats are recomputed.
    pub stats_debounce: Duration,
    pub stats_max_batch: Duration,

    /// Jobs run concurrently per enrichment batch.
    pub batch_size: usize,
    /// Per-pipeline queue bound; overflow drops the oldest entry.
    pub queue_cap: usize,
    pub enrich: EnrichConfig,

    pub cluster_timeout: Duration,
    pub bundle_meta_timeout: Duration,
    pub answer_timeout: Duration,

    /// Capacity of the inbound event channel.
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            structural_debounce: Duration::from_millis(80),
            structural_max_batch: Duration::from_secs(1),
            content_debounce: Duration::from_millis(500),
            content_max_batch: Duration::from_secs(5),
            suggest_debounce: Duration::from_secs(2),
            suggest_max_batch: Duration::from_secs(10),
            stats_debounce: Duration::from_millis(500),
            stats_max_batch: Duration::from_secs(2),
            batch_size: 5,
            queue_cap: 256,
            enrich: EnrichConfig::default(),
            cluster_timeout: Duration::from_secs(10),
            bundle_meta_timeout: Duration::from_secs(15),
            answer_timeout: Duration::from_secs(15),
            event_buffer: 256,
        }
    }
}

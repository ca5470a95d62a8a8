use crate::queue::{EnrichQueue, QueueStats};
use crate::signature::{content_fingerprint, SignatureCache};
use tabfeed_model::{Category, NamedEntities, TabItem};

/// The three derived-field job classes. They write disjoint fields and
/// carry no ordering guarantee relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Summarize,
    Classify,
    Entities,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [
        PipelineKind::Summarize,
        PipelineKind::Classify,
        PipelineKind::Entities,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineKind::Summarize => "summarize",
            PipelineKind::Classify => "classify",
            PipelineKind::Entities => "entities",
        }
    }
}

/// Why a queued tab was not dispatched this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BelowMinContent,
    SignatureUnchanged,
    AlreadySatisfied,
}

/// Outcome of one job, routed back to the store by the engine.
#[derive(Debug, Clone)]
pub enum EnrichmentResult {
    Summary(String),
    Categories(Vec<Category>),
    Entities(NamedEntities),
    Failed,
}

/// One pipeline's queue, dedup state, and re-entrancy guard.
#[derive(Debug)]
pub struct Pipeline {
    pub kind: PipelineKind,
    pub queue: EnrichQueue,
    signatures: SignatureCache,
    /// Set while a batch for this pipeline is in flight; prevents
    /// re-entrant drains. Cleared when the drain empties the queue.
    pub running: bool,
}

impl Pipeline {
    #[must_use]
    pub fn new(kind: PipelineKind, queue_cap: usize) -> Self {
        Self {
            kind,
            queue: EnrichQueue::new(queue_cap),
            signatures: SignatureCache::new(),
            running: false,
        }
    }

    /// Dispatch-time gate. On `Ok`, the item's current fingerprint has
    /// been recorded as last-attempted and the job should run; on `Err`,
    /// the item is skipped this round (skip counter bumped).
    pub fn admit(&mut self, item: &TabItem) -> Result<(), SkipReason> {
        let decision = self.decide(item);
        match decision {
            Ok(fingerprint) => {
                self.signatures.record(item.tab_id, fingerprint);
                self.queue.stats_mut().dispatched += 1;
                Ok(())
            }
            Err(reason) => {
                self.queue.stats_mut().skipped += 1;
                Err(reason)
            }
        }
    }

    fn decide(&self, item: &TabItem) -> Result<u64, SkipReason> {
        if !item.has_min_content() {
            return Err(SkipReason::BelowMinContent);
        }
        if self.target_satisfied(item) {
            return Err(SkipReason::AlreadySatisfied);
        }
        let fingerprint = content_fingerprint(&item.url, &item.title, item.full_text.len());
        if self.signatures.is_unchanged(item.tab_id, fingerprint) {
            return Err(SkipReason::SignatureUnchanged);
        }
        Ok(fingerprint)
    }

    /// Classify and entity extraction treat an already-populated target
    /// field as permanently satisfied; summaries refresh on any
    /// signature change.
    fn target_satisfied(&self, item: &TabItem) -> bool {
        match self.kind {
            PipelineKind::Summarize => false,
            PipelineKind::Classify => !item.categories.is_empty(),
            PipelineKind::Entities => !item.entities.is_empty(),
        }
    }

    /// Drop all per-tab state when the tab leaves the store.
    pub fn forget(&mut self, tab_id: i64) {
        self.queue.forget(tab_id);
        self.signatures.forget(tab_id);
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }
}

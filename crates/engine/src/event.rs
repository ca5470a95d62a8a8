use crate::host::HostError;
use tabfeed_enrich::{EnrichmentResult, PipelineKind};
use tabfeed_model::{Bundle, LiveTab, ScrapePayload, SuggestedBundle, TabItem, Tip};
use tabfeed_stats::SessionStats;
use tokio::sync::oneshot;

/// Everything that enters the engine task: host lifecycle events,
/// content payloads, network observations, UI commands, and the
/// completion events spawned work reports back with.
pub enum EngineEvent {
    TabCreated(LiveTab),
    TabUpdated(LiveTab),
    TabMoved {
        tab_id: i64,
        window_id: i64,
        to_index: i32,
    },
    TabRemoved {
        tab_id: i64,
    },
    Scrape(ScrapePayload),
    NetworkRequest {
        tab_id: i64,
        third_party: bool,
        tracker: bool,
    },
    MixedContent {
        tab_id: i64,
    },
    /// Externally-computed reading-time estimate; only fills a gap.
    ReadingTime {
        tab_id: i64,
        minutes: u32,
    },
    Command(Command),

    // Completions from spawned work. Applied against current store
    // state: the tab may have changed or vanished while in flight.
    BatchDone {
        kind: PipelineKind,
        results: Vec<(i64, EnrichmentResult)>,
    },
    /// `None` means the clustering pass failed; the previous suggestion
    /// set is kept. `Some` replaces it wholesale.
    SuggestionsReady(Option<Vec<SuggestedBundle>>),
    BundleMetaReady {
        bundle_id: String,
        summary: Option<String>,
        tips: Vec<Tip>,
    },
    AnswerReady {
        bundle_id: String,
        question: String,
        answer: String,
    },

    Shutdown,
}

pub type HostReply = oneshot::Sender<std::result::Result<(), HostError>>;

/// UI-originated mutations. Host-touching commands carry an optional
/// reply channel so the caller learns about a vanished tab; everything
/// else is fire-and-forget with the UI re-pulling on the next broadcast.
pub enum Command {
    CreateBundle {
        title: String,
        tab_ids: Vec<i64>,
    },
    AddTabToBundle {
        bundle_id: String,
        tab_id: i64,
    },
    RemoveTabFromBundle {
        bundle_id: String,
        tab_id: Option<i64>,
        url: Option<String>,
    },
    DeleteBundle {
        bundle_id: String,
    },
    UpdateBundleMeta {
        bundle_id: String,
        summary: Option<String>,
        tips: Vec<Tip>,
    },
    SaveBundleAndClose {
        bundle_id: String,
    },
    AskQuestion {
        bundle_id: String,
        question: String,
    },
    FocusTab {
        tab_id: i64,
        window_id: i64,
        reply: Option<HostReply>,
    },
    CloseTab {
        tab_id: i64,
        reply: Option<HostReply>,
    },
    TogglePin {
        tab_id: i64,
        reply: Option<HostReply>,
    },
    Rescrape {
        tab_id: i64,
    },
    Reconcile,
}

/// Fire-and-forget notifications to listening UI surfaces. At-most-once,
/// no delivery guarantee; a listener that missed one re-pulls state on
/// its next interaction.
#[derive(Debug, Clone)]
pub enum StateEvent {
    StateChanged { open_tabs: usize },
    StatsUpdated(SessionStats),
}

/// The current user-visible state, held in a watch channel so any
/// consumer can read the latest without asking the engine task.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub items: Vec<TabItem>,
    pub bundles: Vec<Bundle>,
    pub suggested_bundles: Vec<SuggestedBundle>,
}

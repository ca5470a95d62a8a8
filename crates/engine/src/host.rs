use async_trait::async_trait;
use tabfeed_model::LiveTab;
use thiserror::Error;

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Error, Debug, Clone)]
pub enum HostError {
    #[error("host query failed: {0}")]
    Query(String),

    #[error("tab {0} no longer exists")]
    TabGone(i64),

    #[error("{0}")]
    Other(String),
}

/// The host environment owning the actual browser tabs.
///
/// Every method may fail (a tab can vanish between any two calls) and
/// failures are reported as values, never panics. A `list_tabs` failure
/// skips the current reconcile cycle entirely; mutation failures leave
/// the store to self-heal on the next structural broadcast.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// The authoritative set of currently-open tabs.
    async fn list_tabs(&self) -> HostResult<Vec<LiveTab>>;

    async fn focus_tab(&self, tab_id: i64, window_id: i64) -> HostResult<()>;

    async fn close_tab(&self, tab_id: i64) -> HostResult<()>;

    async fn set_pinned(&self, tab_id: i64, pinned: bool) -> HostResult<()>;

    /// Ask the content collaborator to re-extract page metadata and
    /// text. Fire-and-forget from the engine's perspective; the result
    /// arrives later as a scrape payload, or not at all.
    async fn request_rescrape(&self, tab_id: i64) -> HostResult<()>;
}

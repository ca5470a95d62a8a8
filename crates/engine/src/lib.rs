//! # Tab Feed Engine
//!
//! The reconciliation, enrichment-pipeline, and debounced-broadcast
//! core. One long-lived task owns all mutable state and drives it from
//! four inputs:
//!
//! ```text
//! host lifecycle events ──┐
//! scrape payloads ────────┤                      ┌─> persisted snapshot
//! network observations ───┼──> engine task ──────┼─> StateChanged /
//! UI commands ────────────┘    (select loop)     │   StatsUpdated
//!                                 │              └─> FeedSnapshot watch
//!                    spawned work ┘
//!              (enrichment batches, clustering,
//!               bundle synthesis; results return
//!               as events, merged at completion time)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabfeed_capability::Capability;
//! use tabfeed_engine::{EngineConfig, TabFeedHandle};
//! use tabfeed_store::JsonFileGateway;
//!
//! # async fn example(host: Arc<dyn tabfeed_engine::HostBridge>) -> anyhow::Result<()> {
//! let gateway = Arc::new(JsonFileGateway::new("tabfeed-state.json"));
//! let feed = TabFeedHandle::start(
//!     host,
//!     gateway,
//!     Capability::Unavailable,
//!     EngineConfig::default(),
//! )
//! .await;
//!
//! let mut updates = feed.subscribe();
//! while let Ok(event) = updates.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod debounce;
mod error;
mod event;
mod host;
mod service;
mod state;

pub use config::EngineConfig;
pub use debounce::DebounceTimer;
pub use error::{EngineError, Result};
pub use event::{Command, EngineEvent, FeedSnapshot, HostReply, StateEvent};
pub use host::{HostBridge, HostError, HostResult};
pub use service::TabFeedHandle;

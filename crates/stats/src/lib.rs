//! # Tab Feed Stats
//!
//! Ephemeral session-level aggregates derived from the tab store and an
//! auxiliary rolling log of network observations. Recomputed from
//! scratch on a trigger; never persisted; strictly read-only over its
//! inputs.

mod context;
mod request_log;
mod session;

pub use context::context_score;
pub use request_log::{RequestCounts, RequestLog, ROLLING_WINDOW_MS};
pub use session::{compute_session_stats, DomainCount, HotTab, SessionStats};

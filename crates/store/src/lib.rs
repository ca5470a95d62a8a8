//! # Tab Feed Store
//!
//! The process's authoritative view of open-tab state: an in-memory
//! entity store with a merge policy that protects accumulated
//! enrichment, plus the persistence gateway the broadcaster writes
//! through and the engine hydrates from at startup.
//!
//! The store has no interior locking. All access is serialized through
//! the single engine task; every mutation goes through the merge policy.

mod error;
mod gateway;
mod persisted;
mod tab_store;

pub use error::{Result, StoreError};
pub use gateway::{JsonFileGateway, SnapshotGateway};
pub use persisted::{PersistedState, STATE_SCHEMA_VERSION};
pub use tab_store::TabStore;

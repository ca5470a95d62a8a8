//! # Tab Feed Bundles
//!
//! Thematic grouping of tabs: clustering suggestions proposed through
//! the external capability, bundle lifecycle helpers, and the derived
//! cross-bundle enrichment (summary, action tips, Q&A). Tips generation
//! carries a deterministic fallback, the one enrichment in the system
//! that is guaranteed to produce output.

mod ops;
mod suggest;
mod synthesis;
mod tips;

pub use ops::{archive_members, new_bundle, remove_member};
pub use suggest::{eligible_items, filter_proposals, propose_bundles, RawProposal};
pub use synthesis::{answer_question, build_context, generate_summary};
pub use tips::{deterministic_tips, generate_tips, normalize_tips, RawTip};

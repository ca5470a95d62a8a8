//! # Tab Feed Capability
//!
//! Boundary to the external text-generation capability. The capability
//! may be entirely absent in a given host environment, and when present
//! it may hang, fail, or return free text where structured output was
//! requested. Callers treat all of those identically: no enrichment this
//! time, retry opportunistically later.

mod parse;

pub use parse::{parse_structured, strip_code_fences};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CapabilityError>;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("capability not available in this environment")]
    Unavailable,

    #[error("capability call timed out after {0:?}")]
    Timeout(Duration),

    #[error("capability call failed: {0}")]
    Failed(String),
}

/// An external text-generation service. Implementations are expected to
/// be side-effect free from the core's perspective; the core never
/// retries a call eagerly.
#[async_trait]
pub trait TextCapability: Send + Sync {
    /// Run `instruction` over `input` and return the raw response text.
    async fn generate(&self, instruction: &str, input: &str) -> Result<String>;
}

/// Handle over an optionally-present capability. Call sites match on
/// availability through [`Capability::generate`] rather than probing.
#[derive(Clone)]
pub enum Capability {
    Available(Arc<dyn TextCapability>),
    Unavailable,
}

impl Capability {
    #[must_use]
    pub fn from_provider(provider: Arc<dyn TextCapability>) -> Self {
        Capability::Available(provider)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Run a capability call under an explicit deadline. The host
    /// environment may silently never resolve a call for an unavailable
    /// capability, so an un-deadlined await could hang a pipeline
    /// forever. A timed-out call's eventual late result is discarded by
    /// construction: the future is dropped here.
    pub async fn generate(
        &self,
        instruction: &str,
        input: &str,
        timeout: Duration,
    ) -> Result<String> {
        let provider = match self {
            Capability::Available(provider) => provider,
            Capability::Unavailable => return Err(CapabilityError::Unavailable),
        };
        match tokio::time::timeout(timeout, provider.generate(instruction, input)).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(timeout)),
        }
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Available(_) => f.write_str("Capability::Available"),
            Capability::Unavailable => f.write_str("Capability::Unavailable"),
        }
    }
}

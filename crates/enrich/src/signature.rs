use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Stable 64-bit fingerprint of the inputs an enrichment job consumes:
/// `(url, title, content length)`. Equal fingerprints mean nothing
/// relevant changed since the last attempt, so the job can be skipped.
#[must_use]
pub fn content_fingerprint(url: &str, title: &str, content_len: usize) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update([0u8]);
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    hasher.update(content_len.to_le_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Last-attempted fingerprint per tab for one pipeline. Recorded at
/// dispatch time, not completion time, so a failed job is not
/// re-submitted until its inputs actually change.
#[derive(Debug, Default)]
pub struct SignatureCache {
    last: HashMap<i64, u64>,
}

impl SignatureCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_unchanged(&self, tab_id: i64, fingerprint: u64) -> bool {
        self.last.get(&tab_id) == Some(&fingerprint)
    }

    pub fn record(&mut self, tab_id: i64, fingerprint: u64) {
        self.last.insert(tab_id, fingerprint);
    }

    pub fn forget(&mut self, tab_id: i64) {
        self.last.remove(&tab_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

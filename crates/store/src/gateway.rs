use crate::error::Result;
use crate::persisted::PersistedState;
use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Durable key-value boundary for the persisted snapshot document.
///
/// Written by the broadcaster (full overwrite, best-effort) and read
/// once at process start. A single active writer is assumed.
#[async_trait]
pub trait SnapshotGateway: Send + Sync {
    async fn persist(&self, state: &PersistedState) -> Result<()>;

    /// Read the persisted document, or `None` when no usable snapshot
    /// exists. Implementations must treat a corrupt record as absent
    /// rather than failing startup.
    async fn hydrate(&self) -> Result<Option<PersistedState>>;
}

/// Gateway backed by a single JSON file, written atomically via a
/// temp-file rename so a crash mid-write never corrupts the snapshot.
#[derive(Clone, Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotGateway for JsonFileGateway {
    async fn persist(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn hydrate(&self) -> Result<Option<PersistedState>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<PersistedState>(&data) {
            Ok(state) => {
                info!(
                    "Hydrated snapshot: {} items, {} bundles",
                    state.items.len(),
                    state.bundles.len()
                );
                Ok(Some(state))
            }
            Err(err) => {
                warn!(
                    "Persisted snapshot at {} is corrupt ({err}); starting empty",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }
}

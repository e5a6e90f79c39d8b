// crates/meridian-sync/src/metagraph.rs
//
// The Metagraph owner: holds the current snapshot and replaces it on sync
// and load.
//
// Readers take a cheap `Arc<Snapshot>` handle that stays valid after later
// replacements. Mutators (sync, load, clear) are serialized by a mutex and
// publish by swapping the Arc under a write lock, so a half-built snapshot is
// never visible and a failed pass leaves the previous one in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use meridian_core::error::MeridianError;
use meridian_core::neuron::NeuronRecord;
use meridian_core::snapshot::Snapshot;
use meridian_core::traits::Ledger;
use meridian_store::file;

use crate::builder::build_snapshot;

/// Default bound on the ledger queries of one sync pass.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of [`Metagraph::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot at this path is now current.
    Loaded(PathBuf),
    /// No file at this path; the current snapshot was left as it was.
    Missing(PathBuf),
}

/// Local, versioned view of the ledger's network state.
pub struct Metagraph {
    ledger: Arc<dyn Ledger>,
    root_dir: PathBuf,
    sync_timeout: Duration,
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl Metagraph {
    /// Create a metagraph over `ledger`, starting from the empty snapshot.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            root_dir: file::default_root_dir(),
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            current: RwLock::new(Arc::new(Snapshot::empty())),
            writer: Mutex::new(()),
        }
    }

    /// Directory holding `<network>.json` snapshot files.
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Bound on the ledger queries of each sync pass.
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Network served by the ledger.
    pub fn network(&self) -> &str {
        self.ledger.network()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Handle to the current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Pull the ledger's current state and publish it as the new snapshot.
    ///
    /// All or nothing: on any failure the previous snapshot stays current.
    /// Dropping the returned future before it completes has the same effect.
    ///
    /// # Errors
    /// Returns `MeridianError::SyncFailed` if the ledger fails or times out,
    /// or if its records cannot be converted.
    pub async fn sync(&self) -> Result<Arc<Snapshot>, MeridianError> {
        let _writer = self.writer.lock().await;

        let (block, neurons) = match tokio::time::timeout(self.sync_timeout, self.fetch()).await
        {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::error!("Metagraph sync failed: {}", e);
                return Err(MeridianError::SyncFailed(e.to_string()));
            }
            Err(_) => {
                tracing::error!(
                    "Metagraph sync timed out after {:?} on network {}",
                    self.sync_timeout,
                    self.network()
                );
                return Err(MeridianError::SyncFailed(format!(
                    "ledger did not answer within {:?}",
                    self.sync_timeout
                )));
            }
        };

        let snapshot = build_snapshot(block, &neurons).map_err(|e| {
            tracing::error!("Metagraph sync rejected ledger data at block {}: {}", block, e);
            MeridianError::SyncFailed(e.to_string())
        })?;
        let snapshot = self.publish(snapshot).await;

        tracing::info!(
            "Synced metagraph on {}: n={} block={}",
            self.network(),
            snapshot.n(),
            snapshot.block()
        );
        Ok(snapshot)
    }

    async fn fetch(&self) -> Result<(u64, Vec<NeuronRecord>), MeridianError> {
        let block = self.ledger.get_current_block().await?;
        let neurons = self.ledger.neurons().await?;
        Ok((block, neurons))
    }

    async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    /// Snapshot file for `network`, defaulting to the ledger's network.
    pub fn snapshot_path(&self, network: Option<&str>) -> Result<PathBuf, MeridianError> {
        let network = network.unwrap_or_else(|| self.ledger.network());
        file::snapshot_path(&self.root_dir, network)
    }

    /// Save the current snapshot under the root directory.
    ///
    /// Returns the path written.
    pub async fn save(&self, network: Option<&str>) -> Result<PathBuf, MeridianError> {
        let path = self.snapshot_path(network)?;
        self.save_to_path(&path).await?;
        Ok(path)
    }

    /// Save the current snapshot to an explicit file path.
    pub async fn save_to_path(&self, path: &Path) -> Result<(), MeridianError> {
        let snapshot = self.snapshot().await;
        file::save_to_path(&snapshot, path)?;
        tracing::info!(
            "Saved metagraph n={} block={} to {}",
            snapshot.n(),
            snapshot.block(),
            path.display()
        );
        Ok(())
    }

    /// Load the snapshot saved for `network`, defaulting to the ledger's
    /// network.
    ///
    /// A missing file is not an error: the current snapshot is kept and
    /// `LoadOutcome::Missing` is returned.
    ///
    /// # Errors
    /// Propagates I/O and deserialization failures.
    pub async fn load(&self, network: Option<&str>) -> Result<LoadOutcome, MeridianError> {
        let path = self.snapshot_path(network)?;
        match self.load_from_path(&path).await {
            Ok(_) => Ok(LoadOutcome::Loaded(path)),
            Err(MeridianError::NotFound(_)) => {
                tracing::warn!(
                    "Did not load metagraph from {}: file does not exist. Save a snapshot first.",
                    path.display()
                );
                Ok(LoadOutcome::Missing(path))
            }
            Err(e) => Err(e),
        }
    }

    /// Load a snapshot from an explicit file path and make it current.
    ///
    /// # Errors
    /// Returns `MeridianError::NotFound` if the file is absent, plus any
    /// I/O or deserialization failure. The current snapshot is unchanged on
    /// error.
    pub async fn load_from_path(&self, path: &Path) -> Result<Arc<Snapshot>, MeridianError> {
        let _writer = self.writer.lock().await;
        let snapshot = file::load_from_path(path)?;
        let snapshot = self.publish(snapshot).await;
        tracing::info!(
            "Loaded metagraph n={} block={} from {}",
            snapshot.n(),
            snapshot.block(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Reset to the empty snapshot.
    pub async fn clear(&self) -> Arc<Snapshot> {
        let _writer = self.writer.lock().await;
        self.publish(Snapshot::empty()).await
    }
}

//! Where checkpoints of failed runs go.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::mux::Checkpoint;

use super::store::JobStore;

/// Records "job at `slot` stopped at this index" so a later run resumes there.
/// Called concurrently from job tasks; implementations serialize writes.
pub trait CheckpointSink: Send + Sync {
    fn persist(&self, slot: usize, checkpoint: Checkpoint) -> Result<()>;
}

/// Writes checkpoints into the job store file, rewriting it whole under a
/// single lock.
pub struct JobStoreFile {
    path: PathBuf,
    store: Mutex<JobStore>,
}

impl JobStoreFile {
    pub fn new(path: impl Into<PathBuf>, store: JobStore) -> Self {
        Self {
            path: path.into(),
            store: Mutex::new(store),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = JobStore::load(&path)?;
        Ok(Self::new(path, store))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current in-memory store.
    pub fn snapshot(&self) -> JobStore {
        match self.store.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CheckpointSink for JobStoreFile {
    fn persist(&self, slot: usize, checkpoint: Checkpoint) -> Result<()> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("job store lock poisoned"))?;
        store.set_checkpoint(slot, checkpoint.segment_index)?;
        store.save(&self.path)?;
        tracing::debug!(
            slot,
            index = checkpoint.segment_index,
            path = %self.path.display(),
            "checkpoint saved"
        );
        Ok(())
    }
}

/// Keeps checkpoints in memory (tests, local-manifest runs).
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(usize, Checkpoint)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<(usize, Checkpoint)> {
        match self.saved.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CheckpointSink for MemorySink {
    fn persist(&self, slot: usize, checkpoint: Checkpoint) -> Result<()> {
        self.saved
            .lock()
            .map_err(|_| anyhow::anyhow!("checkpoint lock poisoned"))?
            .push((slot, checkpoint));
        Ok(())
    }
}

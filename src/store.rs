//! Append-only judgment log with snapshot persistence.

use crate::error::Result;
use crate::judgment::HumanJudgment;
use crate::persistence::{latest_snapshot, load_snapshot, save_snapshot};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

/// Validated, append-only collection of judgments.
///
/// Readers share the log; appends, reloads and snapshot writes are
/// serialized. Records are pushed whole under the write lock, so a reader
/// never observes a partially stored judgment.
#[derive(Debug)]
pub struct JudgmentStore {
    records: RwLock<Vec<HumanJudgment>>,
    output_dir: PathBuf,
    /// Serializes snapshot writes so saves land in call order.
    persist_lock: Mutex<()>,
}

impl JudgmentStore {
    /// Create an empty store writing snapshots into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            output_dir: output_dir.into(),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Validate and append one judgment.
    pub async fn append(&self, judgment: HumanJudgment) -> Result<()> {
        judgment.validate()?;
        self.records.write().await.push(judgment);
        Ok(())
    }

    /// All judgments in insertion order.
    pub async fn all(&self) -> Vec<HumanJudgment> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Write the full current log as a new snapshot and return its path.
    ///
    /// On failure the in-memory log is untouched.
    pub async fn persist(&self) -> Result<PathBuf> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.all().await;

        match save_snapshot(&self.output_dir, &snapshot, &Utc::now()) {
            Ok(path) => {
                info!(path = %path.display(), count = snapshot.len(), "judgments saved");
                Ok(path)
            }
            Err(e) => {
                error!(dir = %self.output_dir.display(), error = %e, "failed to save judgments");
                Err(e)
            }
        }
    }

    /// Replace the in-memory log with the most recent snapshot.
    ///
    /// Fails with `SnapshotNotFound` when nothing has been saved yet; callers
    /// treat that as starting empty.
    pub async fn reload(&self) -> Result<Vec<HumanJudgment>> {
        let _guard = self.persist_lock.lock().await;
        let path = latest_snapshot(&self.output_dir)?;
        let judgments = load_snapshot(&path)?;

        for judgment in &judgments {
            judgment.validate()?;
        }

        *self.records.write().await = judgments.clone();
        info!(path = %path.display(), count = judgments.len(), "judgments reloaded");
        Ok(judgments)
    }
}

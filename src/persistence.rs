//! Snapshot files for the judgment log.
//!
//! Every save produces a new pretty-printed JSON file named after the time it
//! was written; existing snapshots are never overwritten, so the directory
//! doubles as an audit trail of saves.

use crate::error::{EvalError, Result};
use crate::judgment::HumanJudgment;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use walkdir::WalkDir;

/// File name prefix shared by all snapshots.
pub const SNAPSHOT_PREFIX: &str = "human_judge_results_";

const SNAPSHOT_EXT: &str = ".json";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Snapshot file name for a save at `at`.
///
/// Stamped in UTC with fixed-width fields so lexical order matches save order
/// across DST changes; `seq` separates saves landing in the same microsecond.
pub fn snapshot_file_name(at: &DateTime<Utc>, seq: u32) -> String {
    format!(
        "{}{}_{:04}{}",
        SNAPSHOT_PREFIX,
        at.format("%Y%m%d_%H%M%S_%6f"),
        seq,
        SNAPSHOT_EXT
    )
}

fn is_snapshot_name(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(SNAPSHOT_EXT)
}

/// Write `judgments` as a new snapshot in `dir` and return its path.
///
/// The data goes to a hidden temporary file first and is then hard-linked
/// under the first free snapshot name. Linking fails instead of replacing an
/// existing file, so concurrent writers (even in other processes) never
/// clobber each other and readers never see a half-written snapshot.
pub fn save_snapshot(
    dir: &Path,
    judgments: &[HumanJudgment],
    at: &DateTime<Utc>,
) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| EvalError::io(dir, e))?;
    }

    let data = serde_json::to_string_pretty(judgments)
        .map_err(|e| EvalError::Serialization(e.to_string()))?;

    let tmp = dir.join(format!(
        ".{}{}_{}_{}.tmp",
        SNAPSHOT_PREFIX,
        at.format("%Y%m%d_%H%M%S_%6f"),
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&tmp, data.as_bytes()).map_err(|e| EvalError::io(&tmp, e))?;

    let published = publish(&tmp, dir, at);
    // Published snapshots keep their own link.
    let _ = fs::remove_file(&tmp);
    published
}

fn publish(tmp: &Path, dir: &Path, at: &DateTime<Utc>) -> Result<PathBuf> {
    let mut seq = 0;
    loop {
        let candidate = dir.join(snapshot_file_name(at, seq));
        match fs::hard_link(tmp, &candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => seq += 1,
            Err(e) => return Err(EvalError::io(&candidate, e)),
        }
    }
}

/// Read a snapshot file back into judgments, in file order.
pub fn load_snapshot(path: &Path) -> Result<Vec<HumanJudgment>> {
    let data = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| {
        EvalError::Serialization(format!("Invalid snapshot '{}': {}", path.display(), e))
    })
}

/// All snapshots in `dir`, oldest first.
pub fn list_snapshots(dir: &Path) -> Vec<PathBuf> {
    let mut snapshots: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_snapshot_name))
        .map(|entry| entry.into_path())
        .collect();
    snapshots.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    snapshots
}

/// The most recent snapshot in `dir`.
pub fn latest_snapshot(dir: &Path) -> Result<PathBuf> {
    list_snapshots(dir)
        .pop()
        .ok_or_else(|| EvalError::SnapshotNotFound(dir.to_path_buf()))
}

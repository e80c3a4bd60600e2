//! Autosave persistence for automaton definitions.
//!
//! The store periodically persists the latest definition under a fixed key
//! and restores it at startup, plus keeps timestamped snapshots for manual
//! restore points.
//!
//! ## File Structure
//!
//! ```text
//! .dfa-studio/
//! ├── autosave.json      # Latest definition, overwritten on every save
//! └── snapshots/         # Timestamped restore points
//!     ├── 1703800000000.json
//!     └── 1703800100000.json
//! ```
//!
//! File content is the codec's interchange text, so anything the store
//! writes can be read back by [`crate::decode`] - and by any other host of
//! the format.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use dfa_studio_core::DfaDefinition;
use tracing::{debug, info};

use crate::codec;
use crate::error::DfaResult;

/// Name of the persistence folder.
pub const STUDIO_DIR: &str = ".dfa-studio";

/// File names within the studio directory.
const AUTOSAVE_FILE: &str = "autosave.json";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Store managing autosaves and snapshots under `<root>/.dfa-studio/`.
#[derive(Debug, Clone)]
pub struct AutosaveStore {
    /// Root path chosen by the host (workspace or config directory).
    root: PathBuf,

    /// Path to the `.dfa-studio` directory.
    studio_dir: PathBuf,
}

impl AutosaveStore {
    /// Create a store for the given root directory. Nothing is touched on
    /// disk until the first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let studio_dir = root.join(STUDIO_DIR);
        Self { root, studio_dir }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the studio directory.
    pub fn studio_dir(&self) -> &Path {
        &self.studio_dir
    }

    /// Check if the studio directory exists.
    pub fn exists(&self) -> bool {
        self.studio_dir.exists()
    }

    /// Initialize the directory structure.
    pub fn init(&self) -> DfaResult<()> {
        if !self.studio_dir.exists() {
            std::fs::create_dir_all(&self.studio_dir)?;
            debug!(path = %self.studio_dir.display(), "created studio directory");
        }

        let snapshots_dir = self.studio_dir.join(SNAPSHOTS_DIR);
        if !snapshots_dir.exists() {
            std::fs::create_dir_all(&snapshots_dir)?;
        }

        Ok(())
    }

    // =========================================================================
    // Autosave
    // =========================================================================

    /// Check if an autosave exists.
    pub fn has_autosave(&self) -> bool {
        self.studio_dir.join(AUTOSAVE_FILE).exists()
    }

    /// Persist the definition under the fixed autosave key.
    pub fn save(&self, definition: &DfaDefinition) -> DfaResult<PathBuf> {
        self.init()?;

        let path = self.studio_dir.join(AUTOSAVE_FILE);
        let text = codec::encode(definition)?;
        std::fs::write(&path, &text)?;

        info!(
            path = %path.display(),
            states = definition.state_count(),
            transitions = definition.transition_count(),
            "autosave written"
        );

        Ok(path)
    }

    /// Restore the autosaved definition, if one exists.
    pub fn restore(&self) -> DfaResult<Option<DfaDefinition>> {
        let path = self.studio_dir.join(AUTOSAVE_FILE);

        if !path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&path)?;
        let definition = codec::decode(&text)?;

        info!(
            path = %path.display(),
            states = definition.state_count(),
            "autosave restored"
        );

        Ok(Some(definition))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Create a timestamped snapshot of the definition.
    pub fn snapshot(&self, definition: &DfaDefinition) -> DfaResult<PathBuf> {
        self.init()?;

        let timestamp = Utc::now().timestamp_millis();
        let path = self
            .studio_dir
            .join(SNAPSHOTS_DIR)
            .join(format!("{timestamp}.json"));

        let text = codec::encode(definition)?;
        std::fs::write(&path, &text)?;

        info!(
            path = %path.display(),
            name = %definition.metadata.name,
            "snapshot created"
        );

        Ok(path)
    }

    /// List available snapshots (newest first).
    pub fn list_snapshots(&self) -> DfaResult<Vec<SnapshotInfo>> {
        let snapshots_dir = self.studio_dir.join(SNAPSHOTS_DIR);

        if !snapshots_dir.exists() {
            return Ok(vec![]);
        }

        let mut snapshots: Vec<SnapshotInfo> = std::fs::read_dir(&snapshots_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
            })
            .filter_map(|e| {
                let path = e.path();
                let stem = path.file_stem()?.to_str()?;
                let timestamp: i64 = stem.parse().ok()?;
                Some(SnapshotInfo { path, timestamp })
            })
            .collect();

        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(snapshots)
    }

    /// Load a specific snapshot.
    pub fn load_snapshot(&self, path: &Path) -> DfaResult<DfaDefinition> {
        let text = std::fs::read_to_string(path)?;
        let definition = codec::decode(&text)?;

        info!(path = %path.display(), "snapshot loaded");

        Ok(definition)
    }

    /// Load the most recent snapshot.
    pub fn load_latest_snapshot(&self) -> DfaResult<Option<DfaDefinition>> {
        let snapshots = self.list_snapshots()?;

        if let Some(latest) = snapshots.first() {
            Ok(Some(self.load_snapshot(&latest.path)?))
        } else {
            Ok(None)
        }
    }

    /// Delete old snapshots, keeping only the N most recent.
    pub fn prune_snapshots(&self, keep: usize) -> DfaResult<usize> {
        let snapshots = self.list_snapshots()?;

        if snapshots.len() <= keep {
            return Ok(0);
        }

        let to_delete = &snapshots[keep..];
        let mut deleted = 0;

        for snapshot in to_delete {
            if std::fs::remove_file(&snapshot.path).is_ok() {
                deleted += 1;
                debug!(path = %snapshot.path.display(), "deleted old snapshot");
            }
        }

        info!(deleted, kept = keep, "pruned old snapshots");
        Ok(deleted)
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    /// Remove all persisted data.
    pub fn clean(&self) -> DfaResult<()> {
        if self.studio_dir.exists() {
            std::fs::remove_dir_all(&self.studio_dir)?;
            info!(path = %self.studio_dir.display(), "removed studio directory");
        }
        Ok(())
    }

    /// Get storage statistics.
    pub fn stats(&self) -> DfaResult<StoreStats> {
        if !self.exists() {
            return Ok(StoreStats::default());
        }

        let mut total_size = 0u64;
        let mut file_count = 0usize;

        for entry in walkdir::WalkDir::new(&self.studio_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() {
                total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                file_count += 1;
            }
        }

        let snapshots = self.list_snapshots().unwrap_or_default();

        Ok(StoreStats {
            total_size,
            file_count,
            snapshot_count: snapshots.len(),
            has_autosave: self.has_autosave(),
        })
    }
}

/// Information about a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Path to the snapshot file.
    pub path: PathBuf,

    /// Unix millisecond timestamp when the snapshot was created.
    pub timestamp: i64,
}

impl SnapshotInfo {
    /// Get the snapshot creation time.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Storage statistics.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Total size of all files in bytes.
    pub total_size: u64,

    /// Number of files.
    pub file_count: usize,

    /// Number of snapshots.
    pub snapshot_count: usize,

    /// Whether an autosave exists.
    pub has_autosave: bool,
}

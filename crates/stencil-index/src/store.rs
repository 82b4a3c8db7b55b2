//! Index snapshot store.
//!
//! The serialized index is parsed once into an immutable [`IndexSnapshot`]
//! that every reader shares. A reload parses the file fully before swapping
//! the snapshot pointer, so in-flight readers always see a consistent
//! old-or-new view and a failed reload leaves the previous snapshot in
//! place.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{IndexError, IndexResult};
use crate::schema::{CatalogEntry, EntryType};

/// An immutable view of the catalog index.
#[derive(Debug)]
pub struct IndexSnapshot {
    entries: Vec<CatalogEntry>,
    loaded_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Build a snapshot directly from entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            loaded_at: Utc::now(),
        }
    }

    /// All entries, in index order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// When this snapshot was built.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of one kind.
    pub fn count_of_type(&self, entry_type: EntryType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .count()
    }

    /// Look up an entry by exact name. Names are unique per type partition
    /// only; stacks shadow samples of the same name.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.entry_type == EntryType::Stack && e.name == name)
            .or_else(|| self.entries.iter().find(|e| e.name == name))
    }
}

/// Loads and holds the current index snapshot.
#[derive(Debug)]
pub struct IndexStore {
    index_path: PathBuf,
    snapshot: RwLock<Arc<IndexSnapshot>>,
}

impl IndexStore {
    /// Load the index from a serialized entry list at `index_path`.
    pub async fn open(index_path: impl Into<PathBuf>) -> IndexResult<Self> {
        let index_path = index_path.into();
        let snapshot = Self::load(&index_path).await?;
        info!(
            path = %index_path.display(),
            entries = snapshot.len(),
            "loaded catalog index"
        );
        Ok(Self {
            index_path,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Build a store around in-memory entries, for tests and embedding.
    /// `reload` is not available without a backing file.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            index_path: PathBuf::new(),
            snapshot: RwLock::new(Arc::new(IndexSnapshot::from_entries(entries))),
        }
    }

    /// The path the index was loaded from.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// The current snapshot. Cheap; callers keep the `Arc` for the duration
    /// of one request.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Re-read the index file and install the fresh snapshot atomically.
    pub async fn reload(&self) -> IndexResult<()> {
        let fresh = Self::load(&self.index_path).await?;
        debug!(entries = fresh.len(), "installing refreshed index snapshot");
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(fresh);
        Ok(())
    }

    async fn load(path: &Path) -> IndexResult<IndexSnapshot> {
        let bytes = tokio::fs::read(path).await.map_err(|e| IndexError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_slice(&bytes).map_err(|e| IndexError::Load {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(IndexSnapshot::from_entries(entries))
    }
}

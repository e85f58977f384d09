use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use pathguard_core::AppResult;
use pathguard_domain::{ModelAction, ModelKey};

/// Precomputed permission summary for one subject and root model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSnapshot {
    /// Subject the snapshot was built for.
    pub subject: String,
    /// Root model of every path in the snapshot.
    pub root: ModelKey,
    /// Model-level actions granted on the root model.
    pub allowed_actions: BTreeSet<ModelAction>,
    /// Readable field paths relative to the root model.
    pub readable_fields: BTreeSet<String>,
    /// Writable field paths relative to the root model.
    pub writable_fields: BTreeSet<String>,
}

impl PermissionSnapshot {
    /// Creates a snapshot that grants nothing.
    #[must_use]
    pub fn empty(subject: impl Into<String>, root: ModelKey) -> Self {
        Self {
            subject: subject.into(),
            root,
            allowed_actions: BTreeSet::new(),
            readable_fields: BTreeSet::new(),
            writable_fields: BTreeSet::new(),
        }
    }

    /// Returns whether a model-level action is granted on the root model.
    #[must_use]
    pub fn can_perform(&self, action: ModelAction) -> bool {
        self.allowed_actions.contains(&action)
    }

    /// Returns whether a field path is readable.
    #[must_use]
    pub fn can_read(&self, path: &str) -> bool {
        self.readable_fields.contains(path)
    }

    /// Returns whether a field path is writable.
    #[must_use]
    pub fn can_write(&self, path: &str) -> bool {
        self.writable_fields.contains(path)
    }

    /// Keeps the readable paths of `paths`, preserving their order.
    #[must_use]
    pub fn readable_subset<'a, I>(&self, paths: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths
            .into_iter()
            .filter(|path| self.can_read(path))
            .collect()
    }
}

/// Cache key for one subject and root model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotCacheKey {
    /// Subject identifier.
    pub subject: String,
    /// Root model.
    pub root: ModelKey,
}

/// Snapshot plus the role names it was derived from.
#[derive(Debug, Clone)]
pub struct SnapshotCacheEntry {
    /// Cache key.
    pub key: SnapshotCacheKey,
    /// Built snapshot.
    pub snapshot: Arc<PermissionSnapshot>,
    /// Roles held by the subject when the snapshot was built.
    pub role_names: BTreeSet<String>,
}

/// Cache port for permission snapshots.
///
/// Every invalidation advances the generation. A snapshot built under an older
/// generation must not be stored.
#[async_trait]
pub trait PermissionSnapshotCache: Send + Sync {
    /// Returns the current invalidation generation.
    async fn generation(&self) -> AppResult<u64>;

    /// Returns a live snapshot for the key, if present.
    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<Arc<PermissionSnapshot>>>;

    /// Stores a snapshot built under `generation`. Returns whether it was stored.
    async fn set_snapshot(
        &self,
        entry: SnapshotCacheEntry,
        generation: u64,
        ttl: Option<Duration>,
    ) -> AppResult<bool>;

    /// Evicts every snapshot of a subject. Returns the number evicted.
    async fn invalidate_subject(&self, subject: &str) -> AppResult<usize>;

    /// Evicts every snapshot derived from any of the roles. Returns the number evicted.
    async fn invalidate_roles(&self, role_names: &[String]) -> AppResult<usize>;

    /// Evicts every snapshot.
    async fn clear(&self) -> AppResult<()>;
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use pathguard_application::{
    PermissionSnapshot, PermissionSnapshotCache, SnapshotCacheEntry, SnapshotCacheKey,
};
use pathguard_core::AppResult;

#[derive(Debug, Clone)]
struct CachedSnapshot {
    entry: SnapshotCacheEntry,
    expires_at: Option<Instant>,
}

impl CachedSnapshot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<SnapshotCacheKey, CachedSnapshot>,
    generation: u64,
}

impl CacheState {
    fn evict(&mut self, predicate: impl Fn(&SnapshotCacheEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| !predicate(&cached.entry));
        self.generation = self.generation.wrapping_add(1);
        before - self.entries.len()
    }
}

/// In-memory cache adapter for permission snapshots.
#[derive(Debug, Default)]
pub struct InMemoryPermissionSnapshotCache {
    state: RwLock<CacheState>,
}

impl InMemoryPermissionSnapshotCache {
    /// Creates an empty snapshot cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PermissionSnapshotCache for InMemoryPermissionSnapshotCache {
    async fn generation(&self) -> AppResult<u64> {
        Ok(self.state.read().await.generation)
    }

    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<Arc<PermissionSnapshot>>> {
        {
            let state = self.state.read().await;
            match state.entries.get(key) {
                Some(cached) if cached.is_live(Instant::now()) => {
                    return Ok(Some(Arc::clone(&cached.entry.snapshot)));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut state = self.state.write().await;
        if state
            .entries
            .get(key)
            .is_some_and(|cached| !cached.is_live(Instant::now()))
        {
            state.entries.remove(key);
            tracing::debug!(
                subject = %key.subject,
                root = %key.root,
                "evicted expired permission snapshot"
            );
        }

        Ok(None)
    }

    async fn set_snapshot(
        &self,
        entry: SnapshotCacheEntry,
        generation: u64,
        ttl: Option<Duration>,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                subject = %entry.key.subject,
                root = %entry.key.root,
                built_generation = generation,
                current_generation = state.generation,
                "discarded permission snapshot built before an invalidation"
            );
            return Ok(false);
        }

        let now = Instant::now();
        let expires_at = ttl.map(|ttl| now.checked_add(ttl).unwrap_or(now));
        state
            .entries
            .insert(entry.key.clone(), CachedSnapshot { entry, expires_at });

        Ok(true)
    }

    async fn invalidate_subject(&self, subject: &str) -> AppResult<usize> {
        Ok(self
            .state
            .write()
            .await
            .evict(|entry| entry.key.subject == subject))
    }

    async fn invalidate_roles(&self, role_names: &[String]) -> AppResult<usize> {
        Ok(self.state.write().await.evict(|entry| {
            role_names
                .iter()
                .any(|role_name| entry.role_names.contains(role_name))
        }))
    }

    async fn clear(&self) -> AppResult<()> {
        self.state.write().await.evict(|_| true);
        Ok(())
    }
}

use std::time::Duration;

use pathguard_core::{AppError, AppResult};

/// Default maximum number of segments in a field path.
const DEFAULT_MAX_DEPTH: usize = 3;
/// Default snapshot time-to-live.
const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(300);

/// Runtime settings shared by the resolver, evaluator and snapshot cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    max_depth: usize,
    snapshot_ttl: Option<Duration>,
    cache_enabled: bool,
    anonymous_read: bool,
}

impl EngineConfig {
    /// Creates a validated configuration.
    ///
    /// `snapshot_ttl` of `None` keeps snapshots until an explicit invalidation.
    pub fn new(
        max_depth: usize,
        snapshot_ttl: Option<Duration>,
        cache_enabled: bool,
        anonymous_read: bool,
    ) -> AppResult<Self> {
        if max_depth == 0 {
            return Err(AppError::Validation(
                "maximum traversal depth must be at least 1".to_owned(),
            ));
        }

        if snapshot_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(AppError::Validation(
                "snapshot ttl must be positive; use no expiry instead of zero".to_owned(),
            ));
        }

        Ok(Self {
            max_depth,
            snapshot_ttl,
            cache_enabled,
            anonymous_read,
        })
    }

    /// Returns the maximum number of segments a path may have.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the snapshot time-to-live, if snapshots expire.
    #[must_use]
    pub fn snapshot_ttl(&self) -> Option<Duration> {
        self.snapshot_ttl
    }

    /// Returns whether snapshots are served from the cache.
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Returns whether subjects without roles may read every field.
    #[must_use]
    pub fn anonymous_read(&self) -> bool {
        self.anonymous_read
    }

    /// Returns a copy with a different depth limit.
    pub fn with_max_depth(self, max_depth: usize) -> AppResult<Self> {
        Self::new(
            max_depth,
            self.snapshot_ttl,
            self.cache_enabled,
            self.anonymous_read,
        )
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            snapshot_ttl: Some(DEFAULT_SNAPSHOT_TTL),
            cache_enabled: true,
            anonymous_read: false,
        }
    }
}

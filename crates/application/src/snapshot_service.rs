use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use pathguard_core::{AppError, AppResult};
use pathguard_domain::{FieldPath, ModelKey, PermissionType};

use crate::{
    EngineConfig, ModelGrantSet, PermissionEvaluator, PermissionSnapshot, PermissionSnapshotCache,
    RelationshipResolver, SnapshotCacheEntry, SnapshotCacheKey,
};

/// Builds permission snapshots and owns their cache lifecycle.
#[derive(Clone)]
pub struct PermissionSnapshotService {
    resolver: RelationshipResolver,
    evaluator: PermissionEvaluator,
    cache: Arc<dyn PermissionSnapshotCache>,
    config: EngineConfig,
}

impl PermissionSnapshotService {
    /// Creates a snapshot service.
    #[must_use]
    pub fn new(
        resolver: RelationshipResolver,
        evaluator: PermissionEvaluator,
        cache: Arc<dyn PermissionSnapshotCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            resolver,
            evaluator,
            cache,
            config,
        }
    }

    /// Returns the snapshot for a subject and root model.
    ///
    /// With `use_cache` the cached snapshot is returned when present and a
    /// freshly built one is stored. The result is identical either way.
    pub async fn build(
        &self,
        subject: &str,
        root: &ModelKey,
        use_cache: bool,
    ) -> AppResult<Arc<PermissionSnapshot>> {
        if !(use_cache && self.config.cache_enabled()) {
            let (snapshot, _) = self.build_fresh(subject, root).await?;
            return Ok(Arc::new(snapshot));
        }

        let key = SnapshotCacheKey {
            subject: subject.to_owned(),
            root: root.clone(),
        };
        // Read before building so an invalidation during the build is detected.
        let generation = self.cache.generation().await?;

        if let Some(snapshot) = self.cache.get_snapshot(&key).await? {
            debug!(subject = %subject, root = %root, "permission snapshot cache hit");
            return Ok(snapshot);
        }

        debug!(subject = %subject, root = %root, "permission snapshot cache miss");
        let (snapshot, role_names) = self.build_fresh(subject, root).await?;
        let snapshot = Arc::new(snapshot);
        let stored = self
            .cache
            .set_snapshot(
                SnapshotCacheEntry {
                    key,
                    snapshot: snapshot.clone(),
                    role_names,
                },
                generation,
                self.config.snapshot_ttl(),
            )
            .await?;

        if !stored {
            debug!(
                subject = %subject,
                root = %root,
                "permission snapshot not cached; invalidated while building"
            );
        }

        Ok(snapshot)
    }

    /// Evicts snapshots derived from any of the roles.
    pub async fn invalidate_roles(&self, role_names: &[String]) -> AppResult<usize> {
        let evicted = self.cache.invalidate_roles(role_names).await?;
        info!(roles = ?role_names, evicted, "invalidated permission snapshots for roles");
        Ok(evicted)
    }

    /// Evicts every snapshot of one subject.
    pub async fn invalidate_subject(&self, subject: &str) -> AppResult<usize> {
        let evicted = self.cache.invalidate_subject(subject).await?;
        info!(subject = %subject, evicted, "invalidated permission snapshots for subject");
        Ok(evicted)
    }

    /// Evicts every cached snapshot.
    pub async fn clear_cache(&self) -> AppResult<()> {
        self.cache.clear().await?;
        info!("cleared permission snapshot cache");
        Ok(())
    }

    async fn build_fresh(
        &self,
        subject: &str,
        root: &ModelKey,
    ) -> AppResult<(PermissionSnapshot, BTreeSet<String>)> {
        self.resolver.model(root)?;

        let roles = self.evaluator.subject_roles(subject).await?;
        let mut grants_by_model: HashMap<ModelKey, ModelGrantSet> = HashMap::new();
        let mut snapshot = PermissionSnapshot::empty(subject, root.clone());
        let mut queue: VecDeque<(ModelKey, Option<FieldPath>)> =
            VecDeque::from([(root.clone(), None)]);

        while let Some((model_key, prefix)) = queue.pop_front() {
            let Some(model) = self.resolver.find_model(&model_key) else {
                warn!(
                    root = %root,
                    model = %model_key,
                    prefix = ?prefix.as_ref().map(FieldPath::as_str),
                    "skipping relation to undeclared model while building snapshot"
                );
                continue;
            };

            if !grants_by_model.contains_key(&model_key) {
                let grants = self.evaluator.model_grants(&roles, &model_key).await?;
                grants_by_model.insert(model_key.clone(), grants);
            }
            let grants = grants_by_model.get(&model_key).ok_or_else(|| {
                AppError::Internal(format!("grants for model '{model_key}' were not loaded"))
            })?;

            if prefix.is_none() {
                snapshot.allowed_actions = grants.allowed_actions();
            }

            for field in model.fields() {
                let path = match &prefix {
                    Some(prefix) => prefix.child(field.name())?,
                    None => FieldPath::parse(field.name())?,
                };

                if grants.allows(field.name(), PermissionType::Write) {
                    snapshot.writable_fields.insert(path.as_str().to_owned());
                }

                if !grants.allows(field.name(), PermissionType::Read) {
                    continue;
                }
                snapshot.readable_fields.insert(path.as_str().to_owned());

                if let Some(target) = field.relation_target()
                    && path.depth() < self.resolver.max_depth()
                {
                    queue.push_back((target.clone(), Some(path)));
                }
            }
        }

        Ok((snapshot, roles.role_names()))
    }
}

/// Rejects a write payload containing any key the snapshot does not allow writing.
pub fn enforce_writable_fields<'a, I>(snapshot: &PermissionSnapshot, keys: I) -> AppResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for key in keys {
        if !snapshot.can_write(key) {
            return Err(AppError::Forbidden(format!(
                "field '{}' is not writable on '{}' for subject '{}'",
                key, snapshot.root, snapshot.subject
            )));
        }
    }

    Ok(())
}

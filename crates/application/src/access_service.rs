use std::sync::Arc;

use pathguard_core::AppResult;
use pathguard_domain::{FieldLookup, FieldPath, ModelKey, PermissionType};

use crate::{
    EngineConfig, FilterPathValidator, NestedPermissionChecker, PermissionEvaluator,
    PermissionSnapshot, PermissionSnapshotCache, PermissionSnapshotService, RelationshipResolver,
    RoleStore, SchemaCatalog, enforce_writable_fields,
};

/// Entry points request-handling code calls before querying or serializing.
#[derive(Clone)]
pub struct FieldAccessService {
    validator: FilterPathValidator,
    checker: NestedPermissionChecker,
    snapshots: PermissionSnapshotService,
}

impl FieldAccessService {
    /// Wires the resolver, evaluator, checker and snapshot service.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn SchemaCatalog>,
        role_store: Arc<dyn RoleStore>,
        cache: Arc<dyn PermissionSnapshotCache>,
    ) -> Self {
        let resolver = RelationshipResolver::new(catalog, config.max_depth());
        let evaluator = PermissionEvaluator::new(role_store, config.anonymous_read());

        Self {
            validator: FilterPathValidator::new(resolver.clone()),
            checker: NestedPermissionChecker::new(resolver.clone(), evaluator.clone()),
            snapshots: PermissionSnapshotService::new(resolver, evaluator, cache, config),
        }
    }

    /// Returns the snapshot service, which also exposes cache invalidation.
    #[must_use]
    pub fn snapshots(&self) -> &PermissionSnapshotService {
        &self.snapshots
    }

    /// Splits a raw query key into its field path and lookup operator.
    pub fn validate_filter_field(&self, root: &ModelKey, raw: &str) -> AppResult<FieldLookup> {
        self.validator.validate_filter_field(root, raw)
    }

    /// Returns the filter validator.
    #[must_use]
    pub fn validator(&self) -> &FilterPathValidator {
        &self.validator
    }

    /// Checks a dotted path at every level of its relationship chain.
    pub async fn check_nested_field_permissions(
        &self,
        root: &ModelKey,
        path: &str,
        subject: &str,
        permission: PermissionType,
    ) -> AppResult<bool> {
        let path = FieldPath::parse(path)?;
        self.checker
            .check_path(root, &path, subject, permission)
            .await
    }

    /// Returns the cached permission snapshot for a subject and root model.
    pub async fn permission_snapshot(
        &self,
        subject: &str,
        root: &ModelKey,
    ) -> AppResult<Arc<PermissionSnapshot>> {
        self.snapshots.build(subject, root, true).await
    }

    /// Keeps the candidate output fields the subject may read.
    pub async fn readable_fields<'a, I>(
        &self,
        subject: &str,
        root: &ModelKey,
        candidates: I,
    ) -> AppResult<Vec<&'a str>>
    where
        I: IntoIterator<Item = &'a str> + Send,
    {
        let snapshot = self.permission_snapshot(subject, root).await?;
        Ok(snapshot.readable_subset(candidates))
    }

    /// Rejects a write payload containing a field the subject may not write.
    pub async fn enforce_writable_fields<'a, I>(
        &self,
        subject: &str,
        root: &ModelKey,
        keys: I,
    ) -> AppResult<()>
    where
        I: IntoIterator<Item = &'a str> + Send,
    {
        let snapshot = self.permission_snapshot(subject, root).await?;
        enforce_writable_fields(&snapshot, keys)
    }
}

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use pathguard_core::AppResult;
use pathguard_domain::{ModelAction, ModelKey, PermissionType, RoleDefinition};

/// Read port over persisted roles, grants and assignments.
///
/// Implementations must reflect committed changes synchronously.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Lists the roles assigned to a subject.
    async fn roles_for_subject(&self, subject: &str) -> AppResult<Vec<RoleDefinition>>;

    /// Lists model-level actions granted to a role on a model.
    async fn model_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeSet<ModelAction>>;

    /// Lists field-level grants of a role on a model, keyed by field name.
    async fn field_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeMap<String, BTreeSet<PermissionType>>>;
}

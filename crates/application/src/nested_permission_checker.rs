use std::collections::HashMap;

use tracing::debug;

use pathguard_core::AppResult;
use pathguard_domain::{FieldPath, ModelKey, PermissionType};

use crate::{ModelGrantSet, PermissionEvaluator, RelationshipResolver};

/// Checks a dotted path at every level of its relationship chain.
#[derive(Clone)]
pub struct NestedPermissionChecker {
    resolver: RelationshipResolver,
    evaluator: PermissionEvaluator,
}

impl NestedPermissionChecker {
    /// Creates a checker from its resolver and evaluator.
    #[must_use]
    pub fn new(resolver: RelationshipResolver, evaluator: PermissionEvaluator) -> Self {
        Self {
            resolver,
            evaluator,
        }
    }

    /// Returns whether the subject may apply `permission` to the field at the
    /// end of `path`.
    ///
    /// Every intermediate relation must be readable. Resolution failures are
    /// returned as errors, denials as `Ok(false)`.
    pub async fn check_path(
        &self,
        root: &ModelKey,
        path: &FieldPath,
        subject: &str,
        permission: PermissionType,
    ) -> AppResult<bool> {
        let steps = self.resolver.resolve(root, path)?;
        let roles = self.evaluator.subject_roles(subject).await?;
        let mut grants_by_model: HashMap<ModelKey, ModelGrantSet> = HashMap::new();

        for step in &steps {
            let required = if step.is_terminal {
                permission
            } else {
                PermissionType::Read
            };

            if !grants_by_model.contains_key(&step.model) {
                let grants = self.evaluator.model_grants(&roles, &step.model).await?;
                grants_by_model.insert(step.model.clone(), grants);
            }

            let allowed = grants_by_model
                .get(&step.model)
                .is_some_and(|grants| grants.allows(step.field_name.as_str(), required));

            if !allowed {
                debug!(
                    subject = %subject,
                    root = %root,
                    path = %path,
                    model = %step.model,
                    field = %step.field_name,
                    permission = %required,
                    "nested field access denied"
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pathguard_core::AppError;
    use pathguard_domain::{FieldPath, ModelAction, PermissionType};

    use super::NestedPermissionChecker;
    use crate::test_support::{FakeRoleStore, library_catalog, model_key};
    use crate::{PermissionEvaluator, RelationshipResolver};

    fn checker(store: Arc<FakeRoleStore>, max_depth: usize) -> NestedPermissionChecker {
        NestedPermissionChecker::new(
            RelationshipResolver::new(library_catalog(), max_depth),
            PermissionEvaluator::new(store, false),
        )
    }

    async fn check(
        checker: &NestedPermissionChecker,
        subject: &str,
        path: &str,
        permission: PermissionType,
    ) -> Result<bool, AppError> {
        let path = FieldPath::parse(path)?;
        checker
            .check_path(&model_key("book"), &path, subject, permission)
            .await
    }

    #[tokio::test]
    async fn blocked_at_publisher_level() {
        let store = Arc::new(FakeRoleStore::default());
        store.grant_model("limited", "book", ModelAction::Read).await;
        store.grant_model("limited", "author", ModelAction::Read).await;
        store.assign("limited_user", "limited").await;
        let checker = checker(store, 3);

        let cases = [
            ("title", true),
            ("author__name", true),
            ("author__salary", true),
            ("author__publisher__name", false),
            ("author__publisher__revenue", false),
        ];
        for (path, expected) in cases {
            let result = check(&checker, "limited_user", path, PermissionType::Read).await;
            assert_eq!(result, Ok(expected), "path {path}");
        }
    }

    #[tokio::test]
    async fn ancestor_denial_gates_granted_leaf() {
        let store = Arc::new(FakeRoleStore::default());
        store
            .grant_field("leaf_only", "book", "title", PermissionType::Read)
            .await;
        store.grant_model("leaf_only", "author", ModelAction::Read).await;
        store.grant_model("leaf_only", "publisher", ModelAction::Read).await;
        store.assign("alice", "leaf_only").await;
        let checker = checker(store, 3);

        assert_eq!(
            check(&checker, "alice", "author__publisher__name", PermissionType::Read).await,
            Ok(false)
        );
        assert_eq!(
            check(&checker, "alice", "title", PermissionType::Read).await,
            Ok(true)
        );
    }

    #[tokio::test]
    async fn traversal_requires_read_even_for_write_checks() {
        let store = Arc::new(FakeRoleStore::default());
        store.grant_model("writer", "book", ModelAction::Write).await;
        store.grant_model("writer", "author", ModelAction::Write).await;
        store.assign("alice", "writer").await;
        let checker = checker(store.clone(), 3);

        assert_eq!(
            check(&checker, "alice", "author__name", PermissionType::Write).await,
            Ok(false)
        );

        store.grant_model("writer", "book", ModelAction::Read).await;
        assert_eq!(
            check(&checker, "alice", "author__name", PermissionType::Write).await,
            Ok(true)
        );
    }

    #[tokio::test]
    async fn field_restricted_role_hides_salary() {
        let store = Arc::new(FakeRoleStore::default());
        store
            .grant_model("field_restricted", "book", ModelAction::Read)
            .await;
        store
            .grant_field("field_restricted", "author", "name", PermissionType::Read)
            .await;
        store
            .grant_field("field_restricted", "author", "email", PermissionType::Read)
            .await;
        store.assign("field_user", "field_restricted").await;
        let checker = checker(store, 3);

        let cases = [
            ("title", true),
            ("author__name", true),
            ("author__email", true),
            ("author__salary", false),
            ("author__ssn", false),
            ("author__publisher__name", false),
        ];
        for (path, expected) in cases {
            let result = check(&checker, "field_user", path, PermissionType::Read).await;
            assert_eq!(result, Ok(expected), "path {path}");
        }
    }

    #[tokio::test]
    async fn over_deep_path_is_an_error_not_a_denial() {
        let store = Arc::new(FakeRoleStore::default());
        store.grant_model("reader", "book", ModelAction::Read).await;
        store.assign("alice", "reader").await;
        let checker = checker(store.clone(), 2);

        let result = check(
            &checker,
            "alice",
            "author__publisher__name",
            PermissionType::Read,
        )
        .await;
        assert!(matches!(result, Err(AppError::DepthLimitExceeded { .. })));
        assert_eq!(store.subject_lookups(), 0);
    }

    #[tokio::test]
    async fn malformed_paths_surface_resolution_errors() {
        let store = Arc::new(FakeRoleStore::default());
        let checker = checker(store, 3);

        assert!(matches!(
            check(&checker, "alice", "author__nickname", PermissionType::Read).await,
            Err(AppError::UnknownField(_))
        ));
        assert!(matches!(
            check(&checker, "alice", "title__first", PermissionType::Read).await,
            Err(AppError::InvalidPath(_))
        ));
    }
}

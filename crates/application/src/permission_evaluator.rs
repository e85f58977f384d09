use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use pathguard_core::AppResult;
use pathguard_domain::{ModelAction, ModelKey, PermissionType, RoleDefinition};

use crate::RoleStore;

/// Roles held by one subject at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRoles {
    /// Subject identifier.
    pub subject: String,
    /// Assigned roles.
    pub roles: Vec<RoleDefinition>,
}

impl SubjectRoles {
    /// Returns the assigned role names.
    #[must_use]
    pub fn role_names(&self) -> BTreeSet<String> {
        self.roles.iter().map(|role| role.name().to_owned()).collect()
    }
}

/// Grants of a single role on a single model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleModelGrants {
    /// Model-level actions.
    pub actions: BTreeSet<ModelAction>,
    /// Field-level grants keyed by field name.
    pub fields: BTreeMap<String, BTreeSet<PermissionType>>,
}

impl RoleModelGrants {
    /// Returns whether this role allows `permission` on `field_name`.
    ///
    /// Phase one: if the role holds any field grant of `permission` on the
    /// model, only enumerated fields are allowed. Phase two: otherwise the
    /// matching model-level action allows every field.
    #[must_use]
    pub fn allows(&self, field_name: &str, permission: PermissionType) -> bool {
        if self.enumerates(permission) {
            return self
                .fields
                .get(field_name)
                .is_some_and(|granted| granted.contains(&permission));
        }

        self.actions.contains(&permission.model_action())
    }

    fn enumerates(&self, permission: PermissionType) -> bool {
        self.fields
            .values()
            .any(|granted| granted.contains(&permission))
    }
}

/// Grants of every role a subject holds on one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGrantSet {
    model: ModelKey,
    per_role: Vec<RoleModelGrants>,
    has_roles: bool,
    anonymous_read: bool,
}

impl ModelGrantSet {
    /// Returns the model the grants apply to.
    #[must_use]
    pub fn model(&self) -> &ModelKey {
        &self.model
    }

    /// Returns whether any held role allows `permission` on `field_name`.
    #[must_use]
    pub fn allows(&self, field_name: &str, permission: PermissionType) -> bool {
        if !self.has_roles {
            return self.anonymous_read && permission == PermissionType::Read;
        }

        self.per_role
            .iter()
            .any(|grants| grants.allows(field_name, permission))
    }

    /// Returns the union of model-level actions over all held roles.
    ///
    /// Subjects without roles get read when anonymous read is enabled.
    #[must_use]
    pub fn allowed_actions(&self) -> BTreeSet<ModelAction> {
        if !self.has_roles {
            return if self.anonymous_read {
                BTreeSet::from([ModelAction::Read])
            } else {
                BTreeSet::new()
            };
        }

        self.per_role
            .iter()
            .flat_map(|grants| grants.actions.iter().copied())
            .collect()
    }
}

/// Decides field access for a subject by combining role grants.
#[derive(Clone)]
pub struct PermissionEvaluator {
    role_store: Arc<dyn RoleStore>,
    anonymous_read: bool,
}

impl PermissionEvaluator {
    /// Creates an evaluator over a grant lookup implementation.
    ///
    /// `anonymous_read` is the read decision for subjects holding no role.
    #[must_use]
    pub fn new(role_store: Arc<dyn RoleStore>, anonymous_read: bool) -> Self {
        Self {
            role_store,
            anonymous_read,
        }
    }

    /// Returns whether the subject may perform `permission` on one field.
    pub async fn can_access(
        &self,
        subject: &str,
        model: &ModelKey,
        field_name: &str,
        permission: PermissionType,
    ) -> AppResult<bool> {
        let roles = self.subject_roles(subject).await?;
        let grants = self.model_grants(&roles, model).await?;
        let allowed = grants.allows(field_name, permission);

        if !allowed {
            debug!(
                subject = %subject,
                model = %model,
                field = %field_name,
                permission = %permission,
                "field access denied"
            );
        }

        Ok(allowed)
    }

    /// Loads the roles currently assigned to a subject.
    pub async fn subject_roles(&self, subject: &str) -> AppResult<SubjectRoles> {
        let roles = self.role_store.roles_for_subject(subject).await?;

        Ok(SubjectRoles {
            subject: subject.to_owned(),
            roles,
        })
    }

    /// Loads the grants every held role has on a model.
    pub async fn model_grants(
        &self,
        roles: &SubjectRoles,
        model: &ModelKey,
    ) -> AppResult<ModelGrantSet> {
        let mut per_role = Vec::with_capacity(roles.roles.len());
        for role in &roles.roles {
            per_role.push(RoleModelGrants {
                actions: self.role_store.model_grants(role.name(), model).await?,
                fields: self.role_store.field_grants(role.name(), model).await?,
            });
        }

        Ok(ModelGrantSet {
            model: model.clone(),
            per_role,
            has_roles: !roles.roles.is_empty(),
            anonymous_read: self.anonymous_read,
        })
    }
}

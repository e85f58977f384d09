use pathguard_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{ModelAction, ModelKey, PermissionType};

/// Named bundle of grants that can be assigned to subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    role_id: NonEmptyString,
    name: NonEmptyString,
}

impl RoleDefinition {
    /// Creates a role definition.
    pub fn new(role_id: impl Into<String>, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            role_id: NonEmptyString::new(role_id)?,
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the stable role identifier.
    #[must_use]
    pub fn role_id(&self) -> &str {
        self.role_id.as_str()
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// What a grant covers on its model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum GrantKind {
    /// Action on the whole model.
    Model {
        /// Granted action.
        action: ModelAction,
    },
    /// Permission on exactly one field.
    Field {
        /// Granted field name.
        field_name: NonEmptyString,
        /// Granted permission type.
        permission_type: PermissionType,
    },
}

/// Grant owned by exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    role_name: NonEmptyString,
    model: ModelKey,
    kind: GrantKind,
}

impl RoleGrant {
    /// Creates a model-level grant.
    pub fn model(
        role_name: impl Into<String>,
        model: ModelKey,
        action: ModelAction,
    ) -> AppResult<Self> {
        Ok(Self {
            role_name: NonEmptyString::new(role_name)?,
            model,
            kind: GrantKind::Model { action },
        })
    }

    /// Creates a field-level grant.
    pub fn field(
        role_name: impl Into<String>,
        model: ModelKey,
        field_name: impl Into<String>,
        permission_type: PermissionType,
    ) -> AppResult<Self> {
        Ok(Self {
            role_name: NonEmptyString::new(role_name)?,
            model,
            kind: GrantKind::Field {
                field_name: NonEmptyString::new(field_name)?,
                permission_type,
            },
        })
    }

    /// Returns the owning role name.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role_name.as_str()
    }

    /// Returns the granted model.
    #[must_use]
    pub fn model_key(&self) -> &ModelKey {
        &self.model
    }

    /// Returns the grant scope.
    #[must_use]
    pub fn kind(&self) -> &GrantKind {
        &self.kind
    }

    /// Returns the field name for field-level grants.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match &self.kind {
            GrantKind::Field { field_name, .. } => Some(field_name.as_str()),
            GrantKind::Model { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GrantKind, RoleDefinition, RoleGrant};
    use crate::{ModelAction, ModelKey, PermissionType};

    #[test]
    fn role_requires_name() {
        assert!(RoleDefinition::new("1", "").is_err());
    }

    #[test]
    fn field_name_distinguishes_grant_kinds() {
        let model = ModelKey::new("library", "author").unwrap_or_else(|_| unreachable!());
        let model_grant = RoleGrant::model("editor", model.clone(), ModelAction::Read)
            .unwrap_or_else(|_| unreachable!());
        let field_grant = RoleGrant::field("editor", model, "email", PermissionType::Read)
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(model_grant.field_name(), None);
        assert_eq!(field_grant.field_name(), Some("email"));
        assert!(matches!(
            field_grant.kind(),
            GrantKind::Field {
                permission_type: PermissionType::Read,
                ..
            }
        ));
    }
}

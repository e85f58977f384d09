use std::str::FromStr;

use pathguard_core::AppError;
use serde::{Deserialize, Serialize};

/// Model-level actions a role can be granted on a whole model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelAction {
    /// Read every field of the model.
    Read,
    /// Update every field of the model.
    Write,
    /// Create new records of the model.
    Create,
    /// Delete records of the model.
    Delete,
}

impl ModelAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ModelAction] = &[
            ModelAction::Read,
            ModelAction::Write,
            ModelAction::Create,
            ModelAction::Delete,
        ];

        ALL
    }
}

impl FromStr for ModelAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown model action '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for ModelAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Permission kinds that can be granted on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    /// The field may be read, filtered on and serialized.
    Read,
    /// The field may be written.
    Write,
}

impl PermissionType {
    /// Returns a stable storage value for this permission type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Returns the model-level action that implies this permission on every field.
    #[must_use]
    pub fn model_action(&self) -> ModelAction {
        match self {
            Self::Read => ModelAction::Read,
            Self::Write => ModelAction::Write,
        }
    }
}

impl FromStr for PermissionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(AppError::Validation(format!(
                "unknown field permission type '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for PermissionType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

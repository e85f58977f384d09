//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod field_path;
mod model;
mod role;
mod security;

pub use field_path::{FIELD_PATH_SEPARATOR, FieldLookup, FieldPath, LookupOperator};
pub use model::{FieldKind, ModelDefinition, ModelFieldDefinition, ModelKey};
pub use role::{GrantKind, RoleDefinition, RoleGrant};
pub use security::{ModelAction, PermissionType};

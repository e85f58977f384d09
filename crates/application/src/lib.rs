//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod engine_config;
mod filter_path_validator;
mod nested_permission_checker;
mod permission_evaluator;
mod relationship_resolver;
mod role_admin_service;
mod snapshot_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    PermissionSnapshot, PermissionSnapshotCache, RoleAdminRepository, RoleAssignment, RoleStore,
    SchemaCatalog, SnapshotCacheEntry, SnapshotCacheKey,
};
pub use access_service::FieldAccessService;
pub use engine_config::EngineConfig;
pub use filter_path_validator::{FilterPathValidator, OrderingTerm, RESERVED_QUERY_KEYS};
pub use nested_permission_checker::NestedPermissionChecker;
pub use permission_evaluator::{ModelGrantSet, PermissionEvaluator, RoleModelGrants, SubjectRoles};
pub use relationship_resolver::{RelationshipResolver, ResolvedStep};
pub use role_admin_service::RoleAdminService;
pub use snapshot_service::{PermissionSnapshotService, enforce_writable_fields};

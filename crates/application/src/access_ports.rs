mod role_admin;
mod role_store;
mod schema_catalog;
mod snapshot_cache;

pub use role_admin::{RoleAdminRepository, RoleAssignment};
pub use role_store::RoleStore;
pub use schema_catalog::SchemaCatalog;
pub use snapshot_cache::{
    PermissionSnapshot, PermissionSnapshotCache, SnapshotCacheEntry, SnapshotCacheKey,
};

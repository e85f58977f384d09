//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_snapshot_cache;
mod in_memory_role_store;
mod in_memory_schema_catalog;


pub use in_memory_permission_snapshot_cache::InMemoryPermissionSnapshotCache;
pub use in_memory_role_store::InMemoryRoleStore;
pub use in_memory_schema_catalog::InMemorySchemaCatalog;

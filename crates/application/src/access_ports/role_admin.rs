use async_trait::async_trait;

use pathguard_core::AppResult;
use pathguard_domain::{RoleDefinition, RoleGrant};

/// Assignment projection mapping a subject to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Subject identifier.
    pub subject: String,
    /// Role identifier.
    pub role_id: String,
    /// Role name.
    pub role_name: String,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}

/// Repository port for role, grant and assignment administration.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Creates a role with a unique name.
    async fn create_role(&self, name: &str) -> AppResult<RoleDefinition>;

    /// Deletes a role together with its grants and assignments.
    ///
    /// Returns the subjects that held the role.
    async fn delete_role(&self, name: &str) -> AppResult<Vec<String>>;

    /// Lists all roles ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Stores a grant for an existing role. Saving an existing grant is a no-op.
    async fn save_grant(&self, grant: RoleGrant) -> AppResult<()>;

    /// Removes a grant. Returns whether it existed.
    async fn remove_grant(&self, grant: &RoleGrant) -> AppResult<bool>;

    /// Lists the grants of a role.
    async fn list_grants(&self, role_name: &str) -> AppResult<Vec<RoleGrant>>;

    /// Assigns an existing role to a subject.
    async fn assign_role_to_subject(&self, subject: &str, role_name: &str) -> AppResult<()>;

    /// Removes a role assignment from a subject. Returns whether it existed.
    async fn remove_role_from_subject(&self, subject: &str, role_name: &str) -> AppResult<bool>;

    /// Lists current role assignments.
    async fn list_role_assignments(&self) -> AppResult<Vec<RoleAssignment>>;
}

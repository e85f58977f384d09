use std::sync::Arc;

use tracing::info;

use pathguard_core::AppResult;
use pathguard_domain::{RoleDefinition, RoleGrant};

use crate::{PermissionSnapshotService, RoleAdminRepository, RoleAssignment};

/// Administrative role, grant and assignment workflows.
///
/// Every mutation evicts the snapshots it can affect.
#[derive(Clone)]
pub struct RoleAdminService {
    repository: Arc<dyn RoleAdminRepository>,
    snapshots: PermissionSnapshotService,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleAdminRepository>,
        snapshots: PermissionSnapshotService,
    ) -> Self {
        Self {
            repository,
            snapshots,
        }
    }

    /// Creates a role.
    pub async fn create_role(&self, name: &str) -> AppResult<RoleDefinition> {
        let role = self.repository.create_role(name).await?;
        info!(role = %role.name(), role_id = %role.role_id(), "created role");
        Ok(role)
    }

    /// Deletes a role and everything that belongs to it.
    pub async fn delete_role(&self, name: &str) -> AppResult<()> {
        let subjects = self.repository.delete_role(name).await?;
        info!(role = %name, subjects = subjects.len(), "deleted role");

        self.snapshots.invalidate_roles(&[name.to_owned()]).await?;
        for subject in &subjects {
            self.snapshots.invalidate_subject(subject).await?;
        }

        Ok(())
    }

    /// Lists all roles.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.repository.list_roles().await
    }

    /// Adds a model-level or field-level grant to a role.
    pub async fn add_grant(&self, grant: RoleGrant) -> AppResult<()> {
        let role_name = grant.role_name().to_owned();
        info!(
            role = %role_name,
            model = %grant.model_key(),
            field = ?grant.field_name(),
            "adding grant"
        );

        self.repository.save_grant(grant).await?;
        self.snapshots.invalidate_roles(&[role_name]).await?;
        Ok(())
    }

    /// Removes a grant. Returns whether it existed.
    pub async fn remove_grant(&self, grant: &RoleGrant) -> AppResult<bool> {
        let removed = self.repository.remove_grant(grant).await?;
        if removed {
            info!(
                role = %grant.role_name(),
                model = %grant.model_key(),
                field = ?grant.field_name(),
                "removed grant"
            );
            self.snapshots
                .invalidate_roles(&[grant.role_name().to_owned()])
                .await?;
        }

        Ok(removed)
    }

    /// Lists the grants of a role.
    pub async fn list_grants(&self, role_name: &str) -> AppResult<Vec<RoleGrant>> {
        self.repository.list_grants(role_name).await
    }

    /// Assigns a role to a subject.
    pub async fn assign_role(&self, subject: &str, role_name: &str) -> AppResult<()> {
        self.repository
            .assign_role_to_subject(subject, role_name)
            .await?;
        info!(subject = %subject, role = %role_name, "assigned role");

        self.snapshots.invalidate_subject(subject).await?;
        Ok(())
    }

    /// Removes a role from a subject. Returns whether the assignment existed.
    pub async fn unassign_role(&self, subject: &str, role_name: &str) -> AppResult<bool> {
        let removed = self
            .repository
            .remove_role_from_subject(subject, role_name)
            .await?;
        if removed {
            info!(subject = %subject, role = %role_name, "unassigned role");
            self.snapshots.invalidate_subject(subject).await?;
        }

        Ok(removed)
    }

    /// Lists current role assignments.
    pub async fn list_role_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        self.repository.list_role_assignments().await
    }
}

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use pathguard_application::{RoleAdminRepository, RoleAssignment, RoleStore};
use pathguard_core::{AppError, AppResult};
use pathguard_domain::{
    GrantKind, ModelAction, ModelKey, PermissionType, RoleDefinition, RoleGrant,
};

#[derive(Debug, Default)]
struct RoleState {
    roles: BTreeMap<String, RoleDefinition>,
    grants: BTreeSet<RoleGrant>,
    // (subject, role name) -> assigned_at
    assignments: BTreeMap<(String, String), String>,
}

impl RoleState {
    fn require_role(&self, name: &str) -> AppResult<&RoleDefinition> {
        self.roles
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' does not exist")))
    }
}

/// In-memory role store backing both the read and the admin ports.
///
/// All state lives behind one lock so cascading deletes stay atomic.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    state: RwLock<RoleState>,
}

impl InMemoryRoleStore {
    /// Creates an empty role store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn roles_for_subject(&self, subject: &str) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;

        Ok(state
            .assignments
            .keys()
            .filter(|(stored_subject, _)| stored_subject == subject)
            .filter_map(|(_, role_name)| state.roles.get(role_name).cloned())
            .collect())
    }

    async fn model_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeSet<ModelAction>> {
        let state = self.state.read().await;

        Ok(state
            .grants
            .iter()
            .filter(|grant| grant.role_name() == role_name && grant.model_key() == model)
            .filter_map(|grant| match grant.kind() {
                GrantKind::Model { action } => Some(*action),
                GrantKind::Field { .. } => None,
            })
            .collect())
    }

    async fn field_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeMap<String, BTreeSet<PermissionType>>> {
        let state = self.state.read().await;

        let mut fields: BTreeMap<String, BTreeSet<PermissionType>> = BTreeMap::new();
        for grant in state
            .grants
            .iter()
            .filter(|grant| grant.role_name() == role_name && grant.model_key() == model)
        {
            if let GrantKind::Field {
                field_name,
                permission_type,
            } = grant.kind()
            {
                fields
                    .entry(field_name.as_str().to_owned())
                    .or_default()
                    .insert(*permission_type);
            }
        }

        Ok(fields)
    }
}

#[async_trait]
impl RoleAdminRepository for InMemoryRoleStore {
    async fn create_role(&self, name: &str) -> AppResult<RoleDefinition> {
        let role = RoleDefinition::new(Uuid::new_v4().to_string(), name)?;
        let mut state = self.state.write().await;

        if state.roles.contains_key(role.name()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        state.roles.insert(role.name().to_owned(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, name: &str) -> AppResult<Vec<String>> {
        let mut state = self.state.write().await;
        state.require_role(name)?;

        state.roles.remove(name);
        state.grants.retain(|grant| grant.role_name() != name);

        let mut subjects = Vec::new();
        state.assignments.retain(|(subject, role_name), _| {
            if role_name == name {
                subjects.push(subject.clone());
                false
            } else {
                true
            }
        });

        Ok(subjects)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.state.read().await.roles.values().cloned().collect())
    }

    async fn save_grant(&self, grant: RoleGrant) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_role(grant.role_name())?;
        state.grants.insert(grant);
        Ok(())
    }

    async fn remove_grant(&self, grant: &RoleGrant) -> AppResult<bool> {
        Ok(self.state.write().await.grants.remove(grant))
    }

    async fn list_grants(&self, role_name: &str) -> AppResult<Vec<RoleGrant>> {
        let state = self.state.read().await;
        state.require_role(role_name)?;

        Ok(state
            .grants
            .iter()
            .filter(|grant| grant.role_name() == role_name)
            .cloned()
            .collect())
    }

    async fn assign_role_to_subject(&self, subject: &str, role_name: &str) -> AppResult<()> {
        if subject.trim().is_empty() {
            return Err(AppError::Validation("subject must not be empty".to_owned()));
        }

        let mut state = self.state.write().await;
        state.require_role(role_name)?;
        state
            .assignments
            .entry((subject.to_owned(), role_name.to_owned()))
            .or_insert_with(|| Utc::now().to_rfc3339());

        Ok(())
    }

    async fn remove_role_from_subject(&self, subject: &str, role_name: &str) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .assignments
            .remove(&(subject.to_owned(), role_name.to_owned()))
            .is_some())
    }

    async fn list_role_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        let state = self.state.read().await;

        Ok(state
            .assignments
            .iter()
            .filter_map(|((subject, role_name), assigned_at)| {
                state.roles.get(role_name).map(|role| RoleAssignment {
                    subject: subject.clone(),
                    role_id: role.role_id().to_owned(),
                    role_name: role.name().to_owned(),
                    assigned_at: assigned_at.clone(),
                })
            })
            .collect())
    }
}

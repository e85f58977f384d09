use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pathguard_core::AppResult;
use pathguard_domain::{
    ModelAction, ModelDefinition, ModelFieldDefinition, ModelKey, PermissionType, RoleDefinition,
};

use crate::{
    PermissionSnapshot, PermissionSnapshotCache, RoleStore, SchemaCatalog, SnapshotCacheEntry,
    SnapshotCacheKey,
};

pub(crate) fn model_key(model_name: &str) -> ModelKey {
    ModelKey::new("library", model_name).unwrap_or_else(|_| unreachable!())
}

fn scalar(name: &str) -> ModelFieldDefinition {
    ModelFieldDefinition::scalar(name).unwrap_or_else(|_| unreachable!())
}

fn relation(name: &str, target: &str) -> ModelFieldDefinition {
    ModelFieldDefinition::relation(name, model_key(target)).unwrap_or_else(|_| unreachable!())
}

pub(crate) struct MapSchemaCatalog {
    models: HashMap<ModelKey, ModelDefinition>,
}

impl SchemaCatalog for MapSchemaCatalog {
    fn find_model(&self, key: &ModelKey) -> Option<&ModelDefinition> {
        self.models.get(key)
    }
}

/// Book -> Author -> Publisher, plus a self-relation on author and a relation
/// from book to a model that is not declared.
pub(crate) fn library_catalog() -> Arc<dyn SchemaCatalog> {
    let models = [
        (
            "book",
            vec![
                scalar("title"),
                scalar("isbn"),
                relation("author", "author"),
                relation("series", "series"),
            ],
        ),
        (
            "author",
            vec![
                scalar("name"),
                scalar("email"),
                scalar("salary"),
                scalar("ssn"),
                relation("publisher", "publisher"),
                relation("mentor", "author"),
            ],
        ),
        (
            "publisher",
            vec![scalar("name"), scalar("revenue"), scalar("country")],
        ),
    ]
    .into_iter()
    .map(|(name, fields)| {
        let key = model_key(name);
        let model = ModelDefinition::new(key.clone(), fields).unwrap_or_else(|_| unreachable!());
        (key, model)
    })
    .collect();

    Arc::new(MapSchemaCatalog { models })
}

#[derive(Default)]
pub(crate) struct FakeRoleStore {
    assignments: Mutex<HashMap<String, Vec<String>>>,
    model_grants: Mutex<HashMap<(String, ModelKey), BTreeSet<ModelAction>>>,
    field_grants: Mutex<HashMap<(String, ModelKey), BTreeMap<String, BTreeSet<PermissionType>>>>,
    subject_lookups: AtomicUsize,
}

impl FakeRoleStore {
    pub(crate) async fn assign(&self, subject: &str, role_name: &str) {
        self.assignments
            .lock()
            .await
            .entry(subject.to_owned())
            .or_default()
            .push(role_name.to_owned());
    }

    pub(crate) async fn unassign(&self, subject: &str, role_name: &str) {
        if let Some(roles) = self.assignments.lock().await.get_mut(subject) {
            roles.retain(|stored| stored != role_name);
        }
    }

    pub(crate) async fn grant_model(&self, role_name: &str, model: &str, action: ModelAction) {
        self.model_grants
            .lock()
            .await
            .entry((role_name.to_owned(), model_key(model)))
            .or_default()
            .insert(action);
    }

    pub(crate) async fn grant_field(
        &self,
        role_name: &str,
        model: &str,
        field_name: &str,
        permission_type: PermissionType,
    ) {
        self.field_grants
            .lock()
            .await
            .entry((role_name.to_owned(), model_key(model)))
            .or_default()
            .entry(field_name.to_owned())
            .or_default()
            .insert(permission_type);
    }

    pub(crate) async fn revoke_model(&self, role_name: &str, model: &str, action: ModelAction) {
        if let Some(actions) = self
            .model_grants
            .lock()
            .await
            .get_mut(&(role_name.to_owned(), model_key(model)))
        {
            actions.remove(&action);
        }
    }

    pub(crate) async fn drop_role(&self, role_name: &str) {
        for roles in self.assignments.lock().await.values_mut() {
            roles.retain(|stored| stored != role_name);
        }
        self.model_grants
            .lock()
            .await
            .retain(|(stored, _), _| stored != role_name);
        self.field_grants
            .lock()
            .await
            .retain(|(stored, _), _| stored != role_name);
    }

    pub(crate) fn subject_lookups(&self) -> usize {
        self.subject_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn roles_for_subject(&self, subject: &str) -> AppResult<Vec<RoleDefinition>> {
        self.subject_lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .assignments
            .lock()
            .await
            .get(subject)
            .map(|roles| {
                roles
                    .iter()
                    .map(|name| {
                        RoleDefinition::new(format!("id-{name}"), name.as_str())
                            .unwrap_or_else(|_| unreachable!())
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn model_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeSet<ModelAction>> {
        Ok(self
            .model_grants
            .lock()
            .await
            .get(&(role_name.to_owned(), model.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn field_grants(
        &self,
        role_name: &str,
        model: &ModelKey,
    ) -> AppResult<BTreeMap<String, BTreeSet<PermissionType>>> {
        Ok(self
            .field_grants
            .lock()
            .await
            .get(&(role_name.to_owned(), model.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakeSnapshotCache {
    entries: Mutex<HashMap<SnapshotCacheKey, SnapshotCacheEntry>>,
    generation: Mutex<u64>,
}

impl FakeSnapshotCache {
    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub(crate) async fn bump_generation(&self) {
        *self.generation.lock().await += 1;
    }
}

#[async_trait]
impl PermissionSnapshotCache for FakeSnapshotCache {
    async fn generation(&self) -> AppResult<u64> {
        Ok(*self.generation.lock().await)
    }

    async fn get_snapshot(
        &self,
        key: &SnapshotCacheKey,
    ) -> AppResult<Option<Arc<PermissionSnapshot>>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .map(|entry| entry.snapshot.clone()))
    }

    async fn set_snapshot(
        &self,
        entry: SnapshotCacheEntry,
        generation: u64,
        _ttl: Option<Duration>,
    ) -> AppResult<bool> {
        if generation != *self.generation.lock().await {
            return Ok(false);
        }

        self.entries.lock().await.insert(entry.key.clone(), entry);
        Ok(true)
    }

    async fn invalidate_subject(&self, subject: &str) -> AppResult<usize> {
        self.bump_generation().await;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| key.subject != subject);
        Ok(before - entries.len())
    }

    async fn invalidate_roles(&self, role_names: &[String]) -> AppResult<usize> {
        self.bump_generation().await;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !role_names.iter().any(|role| entry.role_names.contains(role)));
        Ok(before - entries.len())
    }

    async fn clear(&self) -> AppResult<()> {
        self.bump_generation().await;
        self.entries.lock().await.clear();
        Ok(())
    }
}

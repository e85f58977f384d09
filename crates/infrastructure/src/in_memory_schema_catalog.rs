use std::collections::HashMap;

use pathguard_application::SchemaCatalog;
use pathguard_core::{AppError, AppResult};
use pathguard_domain::{ModelDefinition, ModelKey};

/// Immutable schema catalog built once at startup.
#[derive(Debug, Default)]
pub struct InMemorySchemaCatalog {
    models: HashMap<ModelKey, ModelDefinition>,
}

impl InMemorySchemaCatalog {
    /// Creates a catalog, rejecting duplicate models and dangling relations.
    pub fn new(models: Vec<ModelDefinition>) -> AppResult<Self> {
        let mut by_key = HashMap::with_capacity(models.len());
        for model in models {
            let key = model.key().clone();
            if by_key.insert(key.clone(), model).is_some() {
                return Err(AppError::Validation(format!(
                    "model '{key}' is declared more than once"
                )));
            }
        }

        for model in by_key.values() {
            for field in model.fields() {
                if let Some(target) = field.relation_target()
                    && !by_key.contains_key(target)
                {
                    return Err(AppError::Validation(format!(
                        "relation '{}' on model '{}' targets undeclared model '{}'",
                        field.name(),
                        model.key(),
                        target
                    )));
                }
            }
        }

        Ok(Self { models: by_key })
    }

    /// Returns every declared model key, sorted.
    #[must_use]
    pub fn model_keys(&self) -> Vec<&ModelKey> {
        let mut keys: Vec<&ModelKey> = self.models.keys().collect();
        keys.sort();
        keys
    }
}

impl SchemaCatalog for InMemorySchemaCatalog {
    fn find_model(&self, key: &ModelKey) -> Option<&ModelDefinition> {
        self.models.get(key)
    }
}

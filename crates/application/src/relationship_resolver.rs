use std::sync::Arc;

use pathguard_core::{AppError, AppResult};
use pathguard_domain::{FieldPath, ModelDefinition, ModelKey};

use crate::SchemaCatalog;

/// One traversed step of a resolved field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    /// Model that declares the field.
    pub model: ModelKey,
    /// Field name on `model`.
    pub field_name: String,
    /// Relation target, when the field is a relation.
    pub target: Option<ModelKey>,
    /// Whether this is the last step of the path.
    pub is_terminal: bool,
}

/// Walks declared relationships from a root model along a dotted path.
#[derive(Clone)]
pub struct RelationshipResolver {
    catalog: Arc<dyn SchemaCatalog>,
    max_depth: usize,
}

impl RelationshipResolver {
    /// Creates a resolver bounded by `max_depth` path segments.
    #[must_use]
    pub fn new(catalog: Arc<dyn SchemaCatalog>, max_depth: usize) -> Self {
        Self { catalog, max_depth }
    }

    /// Returns the configured maximum number of segments.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Finds a model in the schema catalog.
    pub fn model(&self, key: &ModelKey) -> AppResult<&ModelDefinition> {
        self.catalog
            .find_model(key)
            .ok_or_else(|| AppError::NotFound(format!("model '{key}' is not declared")))
    }

    /// Like [`Self::model`] without the error.
    #[must_use]
    pub fn find_model(&self, key: &ModelKey) -> Option<&ModelDefinition> {
        self.catalog.find_model(key)
    }

    /// Rejects paths with more segments than the configured maximum.
    pub fn ensure_depth(&self, path: &FieldPath) -> AppResult<()> {
        let depth = path.depth();
        if depth > self.max_depth {
            return Err(AppError::DepthLimitExceeded {
                path: path.as_str().to_owned(),
                depth,
                max_depth: self.max_depth,
            });
        }

        Ok(())
    }

    /// Resolves `path` from `root` into the ordered steps it traverses.
    pub fn resolve(&self, root: &ModelKey, path: &FieldPath) -> AppResult<Vec<ResolvedStep>> {
        self.ensure_depth(path)?;

        let depth = path.depth();
        let mut steps = Vec::with_capacity(depth);
        let mut current = self.model(root)?;

        for (index, segment) in path.segments().enumerate() {
            let is_terminal = index + 1 == depth;
            let field = current.field(segment).ok_or_else(|| {
                AppError::UnknownField(format!(
                    "model '{}' has no field '{}' (path '{}')",
                    current.key(),
                    segment,
                    path
                ))
            })?;
            let target = field.relation_target().cloned();

            steps.push(ResolvedStep {
                model: current.key().clone(),
                field_name: segment.to_owned(),
                target: target.clone(),
                is_terminal,
            });

            if is_terminal {
                break;
            }

            let Some(target) = target else {
                return Err(AppError::InvalidPath(format!(
                    "field '{}' on model '{}' is not a relation and cannot be traversed ('{}')",
                    segment,
                    current.key(),
                    path
                )));
            };

            current = self.catalog.find_model(&target).ok_or_else(|| {
                AppError::UnknownField(format!(
                    "relation '{}' on model '{}' targets undeclared model '{}'",
                    segment,
                    current.key(),
                    target
                ))
            })?;
        }

        Ok(steps)
    }
}

use std::collections::HashSet;

use pathguard_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Identity of a model: the namespace (application label) plus the model name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    namespace: NonEmptyString,
    model_name: NonEmptyString,
}

impl ModelKey {
    /// Creates a model key. Model names are stored lowercase.
    pub fn new(namespace: impl Into<String>, model_name: impl Into<String>) -> AppResult<Self> {
        let model_name: String = model_name.into();

        Ok(Self {
            namespace: NonEmptyString::new(namespace)?,
            model_name: NonEmptyString::new(model_name.to_lowercase())?,
        })
    }

    /// Parses a `namespace.model` label.
    pub fn parse(label: &str) -> AppResult<Self> {
        let Some((namespace, model_name)) = label.split_once('.') else {
            return Err(AppError::Validation(format!(
                "model label '{label}' must have the form 'namespace.model'"
            )));
        };

        Self::new(namespace, model_name)
    }

    /// Returns the namespace (application label).
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns the lowercase model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model_name.as_str()
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.namespace, self.model_name)
    }
}

/// Declared kind of a model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldKind {
    /// Plain value; a path must end here.
    Scalar,
    /// Foreign-key-like relation that can be traversed.
    Relation {
        /// Model the relation points to.
        target: ModelKey,
    },
}

/// Declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFieldDefinition {
    name: NonEmptyString,
    kind: FieldKind,
}

impl ModelFieldDefinition {
    /// Creates a scalar field definition.
    pub fn scalar(name: impl Into<String>) -> AppResult<Self> {
        Self::new(name, FieldKind::Scalar)
    }

    /// Creates a relation field definition pointing at `target`.
    pub fn relation(name: impl Into<String>, target: ModelKey) -> AppResult<Self> {
        Self::new(name, FieldKind::Relation { target })
    }

    fn new(name: impl Into<String>, kind: FieldKind) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().contains(crate::FIELD_PATH_SEPARATOR) {
            return Err(AppError::Validation(format!(
                "field name '{}' must not contain the path separator '{}'",
                name,
                crate::FIELD_PATH_SEPARATOR
            )));
        }

        // A trailing underscore would merge into the separator of a joined path.
        if name.as_str().ends_with('_') {
            return Err(AppError::Validation(format!(
                "field name '{name}' must not end with an underscore"
            )));
        }

        Ok(Self { name, kind })
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the relation target when the field is a relation.
    #[must_use]
    pub fn relation_target(&self) -> Option<&ModelKey> {
        match &self.kind {
            FieldKind::Relation { target } => Some(target),
            FieldKind::Scalar => None,
        }
    }
}

/// Declared schema of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    key: ModelKey,
    fields: Vec<ModelFieldDefinition>,
}

impl ModelDefinition {
    /// Creates a model definition with unique field names.
    pub fn new(key: ModelKey, fields: Vec<ModelFieldDefinition>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name().to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate field name '{}' in model '{}'",
                    field.name(),
                    key
                )));
            }
        }

        Ok(Self { key, fields })
    }

    /// Returns the model key.
    #[must_use]
    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    /// Returns all fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[ModelFieldDefinition] {
        &self.fields
    }

    /// Finds a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ModelFieldDefinition> {
        self.fields.iter().find(|field| field.name() == name)
    }
}

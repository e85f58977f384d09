use pathguard_domain::{ModelDefinition, ModelKey};

/// Schema introspection supplied by the data-modeling layer.
///
/// The catalog is treated as immutable for the lifetime of the process.
pub trait SchemaCatalog: Send + Sync {
    /// Finds a model definition by key.
    fn find_model(&self, key: &ModelKey) -> Option<&ModelDefinition>;
}

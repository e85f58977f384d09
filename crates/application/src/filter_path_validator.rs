use pathguard_core::{AppError, AppResult};
use pathguard_domain::{FieldLookup, FieldPath, ModelKey};

use crate::RelationshipResolver;

/// Query keys that control pagination and rendering rather than filtering.
pub const RESERVED_QUERY_KEYS: &[&str] = &["page", "page_size", "search", "ordering", "format"];

/// One term of an `ordering` query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingTerm {
    /// Ordered field path.
    pub path: FieldPath,
    /// Whether the term was prefixed with `-`.
    pub descending: bool,
}

/// Parses query-style field references and applies the depth limit.
///
/// Permission is not decided here; callers pass the returned path to
/// [`crate::NestedPermissionChecker::check_path`].
#[derive(Clone)]
pub struct FilterPathValidator {
    resolver: RelationshipResolver,
}

impl FilterPathValidator {
    /// Creates a validator sharing the resolver's depth limit.
    #[must_use]
    pub fn new(resolver: RelationshipResolver) -> Self {
        Self { resolver }
    }

    /// Splits a raw filter key into its field path and lookup operator.
    pub fn validate_filter_field(&self, root: &ModelKey, raw: &str) -> AppResult<FieldLookup> {
        self.resolver.model(root)?;
        let lookup = FieldLookup::parse(raw)?;
        self.resolver.ensure_depth(&lookup.path)?;
        Ok(lookup)
    }

    /// Validates every filter key of a query, skipping reserved keys.
    pub fn parse_query<'a, I>(&self, root: &ModelKey, keys: I) -> AppResult<Vec<FieldLookup>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter(|key| !RESERVED_QUERY_KEYS.contains(key))
            .map(|key| self.validate_filter_field(root, key))
            .collect()
    }

    /// Validates a comma-separated `ordering` value such as `-author__name,title`.
    pub fn parse_ordering(&self, root: &ModelKey, value: &str) -> AppResult<Vec<OrderingTerm>> {
        self.resolver.model(root)?;

        value
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| {
                let (descending, field) = match term.strip_prefix('-') {
                    Some(field) => (true, field),
                    None => (false, term),
                };
                if field.starts_with('-') {
                    return Err(AppError::Validation(format!(
                        "ordering term '{term}' has more than one '-' prefix"
                    )));
                }

                let path = FieldPath::parse(field)?;
                self.resolver.ensure_depth(&path)?;
                Ok(OrderingTerm { path, descending })
            })
            .collect()
    }
}

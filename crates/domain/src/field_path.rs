use std::str::FromStr;

use pathguard_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Separator between relationship hops in a dotted path.
pub const FIELD_PATH_SEPARATOR: &str = "__";

/// Relationship-traversal field reference such as `author__publisher__name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    /// Parses a dotted path, rejecting empty segments.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.split(FIELD_PATH_SEPARATOR).any(|segment| segment.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "field path '{value}' contains an empty segment"
            )));
        }

        Ok(Self(value))
    }

    /// Builds a path from segments.
    pub fn from_segments<I, S>(segments: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|segment| segment.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(FIELD_PATH_SEPARATOR);

        Self::parse(joined)
    }

    /// Returns a new path with `field_name` appended.
    pub fn child(&self, field_name: &str) -> AppResult<Self> {
        Self::parse(format!("{}{FIELD_PATH_SEPARATOR}{field_name}", self.0))
    }

    /// Returns the path segments in traversal order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(FIELD_PATH_SEPARATOR)
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the last segment.
    #[must_use]
    pub fn terminal(&self) -> &str {
        self.0
            .rsplit_once(FIELD_PATH_SEPARATOR)
            .map_or(self.0.as_str(), |(_, last)| last)
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for FieldPath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Query lookup operators recognised as the trailing segment of a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOperator {
    /// Exact match.
    Exact,
    /// Case-insensitive exact match.
    IExact,
    /// Substring containment.
    Contains,
    /// Case-insensitive substring containment.
    IContains,
    /// Membership in a list.
    In,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Prefix match.
    StartsWith,
    /// Case-insensitive prefix match.
    IStartsWith,
    /// Suffix match.
    EndsWith,
    /// Case-insensitive suffix match.
    IEndsWith,
    /// Inclusive range.
    Range,
    /// Null check.
    IsNull,
    /// Regular expression match.
    Regex,
    /// Case-insensitive regular expression match.
    IRegex,
    /// Date part of a date-time.
    Date,
    /// Year part of a date.
    Year,
    /// Month part of a date.
    Month,
    /// Day part of a date.
    Day,
}

impl LookupOperator {
    /// Returns the query-string suffix for this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::In => "in",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Range => "range",
            Self::IsNull => "isnull",
            Self::Regex => "regex",
            Self::IRegex => "iregex",
            Self::Date => "date",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }

    /// Returns every recognised operator.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LookupOperator] = &[
            LookupOperator::Exact,
            LookupOperator::IExact,
            LookupOperator::Contains,
            LookupOperator::IContains,
            LookupOperator::In,
            LookupOperator::Gt,
            LookupOperator::Gte,
            LookupOperator::Lt,
            LookupOperator::Lte,
            LookupOperator::StartsWith,
            LookupOperator::IStartsWith,
            LookupOperator::EndsWith,
            LookupOperator::IEndsWith,
            LookupOperator::Range,
            LookupOperator::IsNull,
            LookupOperator::Regex,
            LookupOperator::IRegex,
            LookupOperator::Date,
            LookupOperator::Year,
            LookupOperator::Month,
            LookupOperator::Day,
        ];

        ALL
    }
}

impl FromStr for LookupOperator {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|operator| operator.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown lookup operator '{value}'")))
    }
}

/// Filter key split into the field path and an optional lookup operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLookup {
    /// Referenced field path.
    pub path: FieldPath,
    /// Trailing lookup, when the last segment is a recognised operator.
    pub lookup: Option<LookupOperator>,
}

impl FieldLookup {
    /// Splits a raw filter key such as `author__name__icontains`.
    ///
    /// A recognised trailing operator is only stripped when at least one field
    /// segment remains, so a field literally named `date` stays a field.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let path = FieldPath::parse(raw)?;

        if let Some((field_part, last)) = raw.rsplit_once(FIELD_PATH_SEPARATOR)
            && let Ok(lookup) = LookupOperator::from_str(last)
        {
            return Ok(Self {
                path: FieldPath::parse(field_part)?,
                lookup: Some(lookup),
            });
        }

        Ok(Self { path, lookup: None })
    }
}

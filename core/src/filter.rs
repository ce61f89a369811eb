//! Query filter construction.
//!
//! Turns CLI-level filter intent into the API's structured filter grammar:
//!
//! - `--status X` → `{"property": <status prop>, "status": {"equals": X}}`
//! - `--tags a,b` → one `multi_select.contains` leaf per tag against the first
//!   multi-select property, joined with `and` when there is more than one
//! - `--filter key=value` → a leaf whose operator depends on the declared
//!   type of `key`
//!
//! Only one top-level filter survives [`build_filter`]: status is applied
//! first, tags replace it, and a custom filter that resolves replaces both.
//! A branch that cannot be resolved against the schema leaves the previous
//! result in place.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::DatabaseSchema;
use crate::types::PropertyType;

/// Comparison applied to a single property.
///
/// Serializes as the API's `{<type>: {<operator>: <value>}}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Status { equals: String },
    Select { equals: String },
    MultiSelect { contains: String },
    Title { equals: String },
}

impl Condition {
    /// Picks the condition for a property of type `kind`.
    ///
    /// `status`, `select` and `multi_select` get their own operators; every
    /// other type falls back to a title equality match.
    pub fn for_type(kind: Option<&PropertyType>, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            Some(PropertyType::Status) => Self::Status { equals: value },
            Some(PropertyType::Select) => Self::Select { equals: value },
            Some(PropertyType::MultiSelect) => Self::MultiSelect { contains: value },
            _ => Self::Title { equals: value },
        }
    }

    /// Value being compared against.
    pub fn value(&self) -> &str {
        match self {
            Self::Status { equals }
            | Self::Select { equals }
            | Self::Title { equals } => equals,
            Self::MultiSelect { contains } => contains,
        }
    }
}

/// A filter predicate: a single property condition or a conjunction.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::{Condition, Filter};
/// use serde_json::json;
///
/// let filter = Filter::and(vec![
///     Filter::property("Tags", Condition::MultiSelect { contains: "a".into() }),
///     Filter::property("Tags", Condition::MultiSelect { contains: "b".into() }),
/// ]);
/// assert_eq!(
///     serde_json::to_value(&filter).unwrap(),
///     json!({"and": [
///         {"property": "Tags", "multi_select": {"contains": "a"}},
///         {"property": "Tags", "multi_select": {"contains": "b"}}
///     ]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    Property {
        property: String,
        #[serde(flatten)]
        condition: Condition,
    },
    And {
        and: Vec<Filter>,
    },
}

impl Filter {
    pub fn property(property: impl Into<String>, condition: Condition) -> Self {
        Self::Property {
            property: property.into(),
            condition,
        }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { and: filters }
    }
}

/// Reasons a filter branch produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The schema has no status property.
    #[error("database has no status property")]
    NoStatusProperty,
    /// The schema has no multi-select property.
    #[error("database has no multi-select property")]
    NoTagProperty,
    /// Custom filter text without `=`.
    #[error("custom filter '{0}' is not of the form key=value")]
    MissingSeparator(String),
    /// Custom filter names a property the schema does not have.
    #[error("custom filter references unknown property '{0}'")]
    UnknownProperty(String),
}

/// Builds a status equality filter against the schema's status property.
pub fn status_filter(schema: &DatabaseSchema, status: &str) -> Result<Filter, FilterError> {
    let property = schema
        .status_property_name()
        .ok_or(FilterError::NoStatusProperty)?;
    Ok(Filter::property(
        property,
        Condition::Status {
            equals: status.to_string(),
        },
    ))
}

/// Builds a tag containment filter from comma-separated `tags`.
///
/// Each comma-separated token is trimmed; empty tokens are kept. The first
/// multi-select property of the schema is used for every leaf.
pub fn tags_filter(schema: &DatabaseSchema, tags: &str) -> Result<Filter, FilterError> {
    let property = schema
        .tag_property_names()
        .first()
        .ok_or(FilterError::NoTagProperty)?;

    let mut leaves: Vec<Filter> = tags
        .split(',')
        .map(|tag| {
            Filter::property(
                property.as_str(),
                Condition::MultiSelect {
                    contains: tag.trim().to_string(),
                },
            )
        })
        .collect();

    if leaves.len() == 1 {
        Ok(leaves.remove(0))
    } else {
        Ok(Filter::and(leaves))
    }
}

/// Parses a `key=value` filter and resolves `key` against the schema.
///
/// The text is split on the first `=` only and both halves are trimmed. The
/// key is matched case-insensitively; the emitted filter uses the property
/// name as declared in the schema.
pub fn custom_filter(schema: &DatabaseSchema, raw: &str) -> Result<Filter, FilterError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| FilterError::MissingSeparator(raw.to_string()))?;
    let key = key.trim();
    let value = value.trim();

    let def = schema
        .find_property_by_name(key)
        .ok_or_else(|| FilterError::UnknownProperty(key.to_string()))?;

    Ok(Filter::property(
        def.name.as_str(),
        Condition::for_type(def.kind.as_ref(), value),
    ))
}

/// Combines the status, tags and custom filter arguments into one filter.
///
/// Blank arguments count as absent. Later branches replace earlier ones
/// (status, then tags, then custom); a branch that fails to resolve keeps the
/// previous result. Returns `None` when nothing applies.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::{DatabaseSchema, build_filter};
/// use serde_json::json;
///
/// let schema = DatabaseSchema::from_value("db", json!({"properties": {
///     "Stage": {"type": "status"},
///     "Tags": {"type": "multi_select"}
/// }}));
///
/// let filter = build_filter(&schema, Some("Done"), Some("urgent"), None).unwrap();
/// assert_eq!(
///     serde_json::to_value(&filter).unwrap(),
///     json!({"property": "Tags", "multi_select": {"contains": "urgent"}})
/// );
/// ```
pub fn build_filter(
    schema: &DatabaseSchema,
    status: Option<&str>,
    tags: Option<&str>,
    custom: Option<&str>,
) -> Option<Filter> {
    let mut filter = None;

    if let Some(status) = present(status) {
        match status_filter(schema, status) {
            Ok(f) => filter = Some(f),
            Err(err) => debug!(database_id = schema.database_id(), %err, "Skipping status filter"),
        }
    }

    if let Some(tags) = present(tags) {
        match tags_filter(schema, tags) {
            Ok(f) => filter = Some(f),
            Err(err) => debug!(database_id = schema.database_id(), %err, "Skipping tags filter"),
        }
    }

    if let Some(custom) = present(custom) {
        match custom_filter(schema, custom) {
            Ok(f) => filter = Some(f),
            Err(err) => warn!(
                database_id = schema.database_id(),
                %err,
                "Ignoring custom filter; falling back to status/tags filter"
            ),
        }
    }

    filter
}

fn present(arg: Option<&str>) -> Option<&str> {
    arg.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> DatabaseSchema {
        DatabaseSchema::from_value(
            "db",
            json!({"properties": {
                "Name": {"type": "title"},
                "Stage": {"type": "status"},
                "Tags": {"type": "multi_select"},
                "Labels": {"type": "multi_select"},
                "Priority": {"type": "select"},
                "Estimate": {"type": "number"}
            }}),
        )
    }

    fn bare_schema() -> DatabaseSchema {
        DatabaseSchema::from_value("db", json!({"properties": {"Name": {"type": "title"}}}))
    }

    fn leaf(property: &str, condition: Condition) -> Filter {
        Filter::property(property, condition)
    }

    fn contains(tag: &str) -> Condition {
        Condition::MultiSelect {
            contains: tag.to_string(),
        }
    }

    #[test]
    fn test_status_filter() {
        let filter = build_filter(&schema(), Some("In Progress"), None, None);
        assert_eq!(
            filter,
            Some(leaf(
                "Stage",
                Condition::Status {
                    equals: "In Progress".into()
                }
            ))
        );
    }

    #[test]
    fn test_status_without_status_property_is_skipped() {
        assert_eq!(build_filter(&bare_schema(), Some("Done"), None, None), None);
        assert_eq!(
            status_filter(&bare_schema(), "Done"),
            Err(FilterError::NoStatusProperty)
        );
    }

    #[test]
    fn test_single_tag_is_a_leaf() {
        let filter = build_filter(&schema(), None, Some("a"), None);
        assert_eq!(filter, Some(leaf("Tags", contains("a"))));
    }

    #[test]
    fn test_multiple_tags_are_a_conjunction() {
        let filter = build_filter(&schema(), None, Some("a, b"), None);
        assert_eq!(
            filter,
            Some(Filter::and(vec![
                leaf("Tags", contains("a")),
                leaf("Tags", contains("b"))
            ]))
        );
    }

    #[test]
    fn test_inner_empty_tag_tokens_are_kept() {
        let filter = tags_filter(&schema(), "a,,b").unwrap();
        assert_eq!(
            filter,
            Filter::and(vec![
                leaf("Tags", contains("a")),
                leaf("Tags", contains("")),
                leaf("Tags", contains("b"))
            ])
        );
    }

    #[test]
    fn test_blank_arguments_are_absent() {
        assert_eq!(build_filter(&schema(), Some(""), Some("  "), Some(" ")), None);
    }

    #[test]
    fn test_tags_without_tag_property_keep_status() {
        let schema = DatabaseSchema::from_value(
            "db",
            json!({"properties": {"Stage": {"type": "status"}}}),
        );
        let filter = build_filter(&schema, Some("Done"), Some("a"), None);
        assert_eq!(
            filter,
            Some(leaf(
                "Stage",
                Condition::Status {
                    equals: "Done".into()
                }
            ))
        );
    }

    #[test]
    fn test_custom_filter_wins_over_status_and_tags() {
        let filter = build_filter(&schema(), Some("A"), Some("b"), Some("priority=High"));
        assert_eq!(
            filter,
            Some(leaf(
                "Priority",
                Condition::Select {
                    equals: "High".into()
                }
            ))
        );
    }

    #[test]
    fn test_custom_filter_operator_by_type() {
        let s = schema();
        assert_eq!(
            custom_filter(&s, "stage = Done").unwrap(),
            leaf("Stage", Condition::Status { equals: "Done".into() })
        );
        assert_eq!(
            custom_filter(&s, "labels=x").unwrap(),
            leaf("Labels", contains("x"))
        );
        assert_eq!(
            custom_filter(&s, "Estimate=3").unwrap(),
            leaf("Estimate", Condition::Title { equals: "3".into() })
        );
    }

    #[test]
    fn test_custom_filter_splits_on_first_equals() {
        assert_eq!(
            custom_filter(&schema(), "Name = a=b ").unwrap(),
            leaf("Name", Condition::Title { equals: "a=b".into() })
        );
    }

    #[test]
    fn test_unresolved_custom_filter_keeps_previous() {
        let s = schema();
        assert_eq!(
            build_filter(&s, None, Some("a"), Some("nonsense")),
            Some(leaf("Tags", contains("a")))
        );
        assert_eq!(
            build_filter(&s, None, Some("a"), Some("missing=1")),
            Some(leaf("Tags", contains("a")))
        );
        assert_eq!(
            custom_filter(&s, "missing=1"),
            Err(FilterError::UnknownProperty("missing".into()))
        );
        assert_eq!(
            custom_filter(&s, "nonsense"),
            Err(FilterError::MissingSeparator("nonsense".into()))
        );
    }

    #[test]
    fn test_serialized_shapes() {
        let status = leaf("Stage", Condition::Status { equals: "Done".into() });
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"property": "Stage", "status": {"equals": "Done"}})
        );
        let title = leaf("Name", Condition::Title { equals: "x".into() });
        assert_eq!(
            serde_json::to_value(&title).unwrap(),
            json!({"property": "Name", "title": {"equals": "x"}})
        );
    }
}

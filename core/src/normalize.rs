//! Normalization of page property values into portable JSON shapes.
//!
//! The API returns each property value wrapped in a type-specific envelope
//! (`{"type": "select", "select": {"name": "High", ...}}`). [`normalize`]
//! strips the envelope and keeps only what a script consuming the CLI output
//! needs: text, numbers, booleans, lists of names or ids, or `null`.
//!
//! | type                                 | result                              |
//! |--------------------------------------|-------------------------------------|
//! | `title`, `rich_text`                 | concatenated `plain_text` runs      |
//! | `number`                             | number or `null`                    |
//! | `select`, `status`                   | option name or `null`               |
//! | `multi_select`                       | list of option names                |
//! | `date`                               | normalized start date-time or `null`|
//! | `checkbox`                           | boolean                             |
//! | `url`, `email`, `phone_number`       | string or `null`                    |
//! | `formula`                            | the formula result, normalized      |
//! | `relation`, `people`                 | list of ids                         |
//! | `files`                              | list of file names                  |
//! | `created_time`, `last_edited_time`   | timestamp string                    |
//! | `created_by`, `last_edited_by`       | user object, unchanged              |
//! | anything else                        | the whole input, unchanged          |

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::types::PropertyType;

/// Canonical, JSON-safe form of a property value.
///
/// Serializes untagged: `Null` as `null`, lists as arrays, `Raw` as the
/// wrapped JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Names (multi-select options, file names).
    TextList(Vec<String>),
    /// Identifiers (related pages, people).
    IdList(Vec<String>),
    /// Value passed through without interpretation.
    Raw(Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => Value::Number(n),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::TextList(items) | FieldValue::IdList(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            FieldValue::Raw(raw) => raw,
        }
    }
}

/// Normalizes one property value by its `type` tag.
///
/// Never fails: values without a recognized tag are returned unchanged and
/// unparseable dates are passed through as their original string.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::{FieldValue, normalize};
/// use serde_json::json;
///
/// let tags = json!({"type": "multi_select", "multi_select": [{"name": "x"}, {"name": "y"}]});
/// assert_eq!(normalize(&tags), FieldValue::TextList(vec!["x".into(), "y".into()]));
///
/// let formula = json!({"type": "formula", "formula": {"type": "number", "number": 5}});
/// assert_eq!(serde_json::to_value(normalize(&formula)).unwrap(), json!(5));
/// ```
pub fn normalize(raw: &Value) -> FieldValue {
    let Some(kind) = PropertyType::of(raw) else {
        return FieldValue::Raw(raw.clone());
    };
    let body = raw.get(kind.as_str());

    match kind {
        PropertyType::Title | PropertyType::RichText => FieldValue::Text(plain_text(body)),
        PropertyType::Number => match body {
            Some(Value::Number(n)) => FieldValue::Number(n.clone()),
            _ => FieldValue::Null,
        },
        PropertyType::Select | PropertyType::Status => {
            text_or_null(body.and_then(|option| option.get("name")))
        }
        PropertyType::MultiSelect => FieldValue::TextList(collect_member(body, "name")),
        PropertyType::Date => body
            .and_then(|date| date.get("start"))
            .and_then(Value::as_str)
            .filter(|start| !start.is_empty())
            .map(|start| FieldValue::Text(normalize_datetime(start)))
            .unwrap_or(FieldValue::Null),
        PropertyType::Checkbox => match body {
            Some(Value::Bool(b)) => FieldValue::Bool(*b),
            _ => FieldValue::Null,
        },
        PropertyType::Url
        | PropertyType::Email
        | PropertyType::PhoneNumber
        | PropertyType::CreatedTime
        | PropertyType::LastEditedTime => text_or_null(body),
        PropertyType::Formula => match body {
            Some(result) => normalize(result),
            None => FieldValue::Raw(Value::Object(Map::new())),
        },
        PropertyType::Relation | PropertyType::People => {
            FieldValue::IdList(collect_member(body, "id"))
        }
        PropertyType::Files => FieldValue::TextList(collect_member(body, "name")),
        PropertyType::CreatedBy | PropertyType::LastEditedBy => match body {
            Some(Value::Null) | None => FieldValue::Null,
            Some(user) => FieldValue::Raw(user.clone()),
        },
        PropertyType::Other(_) => FieldValue::Raw(raw.clone()),
    }
}

/// Normalizes every value of a page's `properties` object, keeping the
/// order the API returned them in.
pub fn normalize_properties(properties: &Map<String, Value>) -> IndexMap<String, FieldValue> {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), normalize(value)))
        .collect()
}

/// Naive date-time layouts accepted after RFC 3339, most precise first.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Re-serializes an ISO 8601 date or date-time.
///
/// Offset date-times keep their offset (`Z` becomes `+00:00`), naive
/// date-times stay naive, and bare dates gain a midnight time. Missing
/// minutes or seconds are filled with zeros. Sub-second precision is printed
/// as six-digit microseconds, and only when non-zero. Anything else is
/// returned as is.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::normalize_datetime;
///
/// assert_eq!(normalize_datetime("2024-01-15"), "2024-01-15T00:00:00");
/// assert_eq!(normalize_datetime("2024-01-15T10:30:00.000Z"), "2024-01-15T10:30:00+00:00");
/// assert_eq!(normalize_datetime("2024-01-15T10:30:00.25"), "2024-01-15T10:30:00.250000");
/// assert_eq!(normalize_datetime("next tuesday"), "next tuesday");
/// ```
pub fn normalize_datetime(raw: &str) -> String {
    if let Some(dt) = parse_offset(raw) {
        let precision = if has_micros(dt.nanosecond()) {
            SecondsFormat::Micros
        } else {
            SecondsFormat::Secs
        };
        return dt.to_rfc3339_opts(precision, false);
    }
    if let Some(dt) = parse_naive(raw) {
        let layout = if has_micros(dt.nanosecond()) {
            "%Y-%m-%dT%H:%M:%S%.6f"
        } else {
            "%Y-%m-%dT%H:%M:%S"
        };
        return dt.format(layout).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_time(NaiveTime::MIN)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
    }
    raw.to_string()
}

fn parse_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        .ok()
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            // chrono needs a minute field, so an hour-only value is padded.
            if raw.len() != 13 {
                return None;
            }
            NaiveDateTime::parse_from_str(&format!("{raw}:00"), "%Y-%m-%dT%H:%M").ok()
        })
}

/// Whether the fraction survives truncation to microseconds.
fn has_micros(nanos: u32) -> bool {
    nanos / 1_000 != 0
}

fn plain_text(runs: Option<&Value>) -> String {
    runs.and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn text_or_null(value: Option<&Value>) -> FieldValue {
    match value.and_then(Value::as_str) {
        Some(s) => FieldValue::Text(s.to_string()),
        None => FieldValue::Null,
    }
}

/// Collects the string member `key` of every object in an array, skipping
/// entries that lack it.
fn collect_member(items: Option<&Value>, key: &str) -> Vec<String> {
    items
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(key).and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

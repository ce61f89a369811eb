//! Property type definitions shared by the schema model and the normalizer.
//!
//! Every property in a Notion database (and every property value on a page)
//! carries a `type` tag drawn from a fixed enumeration published by the API.
//! [`PropertyType`] models the tags this crate understands, with an
//! [`Other`](PropertyType::Other) arm so unknown tags survive a round trip.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag of a database property or page property value.
///
/// Serialized as the API's snake_case tag (`"multi_select"`,
/// `"last_edited_by"`, ...). Unrecognized tags deserialize into
/// [`Other`](PropertyType::Other) and serialize back unchanged.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::PropertyType;
///
/// assert_eq!(PropertyType::from("multi_select"), PropertyType::MultiSelect);
/// assert_eq!(PropertyType::Status.as_str(), "status");
///
/// let exotic = PropertyType::from("exotic");
/// assert_eq!(exotic, PropertyType::Other("exotic".into()));
/// assert_eq!(exotic.as_str(), "exotic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    Relation,
    People,
    Files,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
    /// Any tag not listed above, kept verbatim.
    Other(String),
}

impl PropertyType {
    /// Returns the API tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Formula => "formula",
            Self::Relation => "relation",
            Self::People => "people",
            Self::Files => "files",
            Self::CreatedTime => "created_time",
            Self::CreatedBy => "created_by",
            Self::LastEditedTime => "last_edited_time",
            Self::LastEditedBy => "last_edited_by",
            Self::Other(tag) => tag,
        }
    }

    /// Returns `true` for types whose definition declares an option list
    /// (`select`, `multi_select`, `status`).
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect | Self::Status)
    }

    /// Reads the `type` member of a raw property object.
    ///
    /// Returns `None` when the member is missing or not a string.
    pub fn of(raw: &Value) -> Option<Self> {
        raw.get("type").and_then(Value::as_str).map(Self::from)
    }
}

impl From<&str> for PropertyType {
    fn from(tag: &str) -> Self {
        match tag {
            "title" => Self::Title,
            "rich_text" => Self::RichText,
            "number" => Self::Number,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "status" => Self::Status,
            "date" => Self::Date,
            "checkbox" => Self::Checkbox,
            "url" => Self::Url,
            "email" => Self::Email,
            "phone_number" => Self::PhoneNumber,
            "formula" => Self::Formula,
            "relation" => Self::Relation,
            "people" => Self::People,
            "files" => Self::Files,
            "created_time" => Self::CreatedTime,
            "created_by" => Self::CreatedBy,
            "last_edited_time" => Self::LastEditedTime,
            "last_edited_by" => Self::LastEditedBy,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PropertyType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<PropertyType> for String {
    fn from(kind: PropertyType) -> Self {
        match kind {
            PropertyType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named property definition taken from a database schema.
///
/// Keeps the raw definition object so type-specific metadata the crate does
/// not model stays available.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Property name as it appears in the database.
    pub name: String,
    /// Declared type, or `None` if the definition carries no `type` tag.
    pub kind: Option<PropertyType>,
    /// Raw definition object as returned by the API.
    pub raw: Value,
}

impl PropertyDefinition {
    /// Wraps a raw definition object under `name`.
    pub fn new(name: impl Into<String>, raw: Value) -> Self {
        Self {
            name: name.into(),
            kind: PropertyType::of(&raw),
            raw,
        }
    }

    /// Returns `true` if the declared type equals `kind`.
    pub fn is(&self, kind: &PropertyType) -> bool {
        self.kind.as_ref() == Some(kind)
    }

    /// Names of the options declared under the `kind` member of the
    /// definition (e.g. `{"status": {"options": [...]}}`).
    ///
    /// Options whose name is missing or empty are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use notion_kanban_core::{PropertyDefinition, PropertyType};
    /// use serde_json::json;
    ///
    /// let def = PropertyDefinition::new("Stage", json!({
    ///     "type": "status",
    ///     "status": {"options": [{"name": "Todo"}, {"name": ""}, {"name": "Done"}]}
    /// }));
    /// assert_eq!(def.option_names(&PropertyType::Status), vec!["Todo", "Done"]);
    /// ```
    pub fn option_names(&self, kind: &PropertyType) -> Vec<String> {
        self.raw
            .get(kind.as_str())
            .and_then(|body| body.get("options"))
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|opt| opt.get("name").and_then(Value::as_str))
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

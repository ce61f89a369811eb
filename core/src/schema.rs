//! Database schema model with lazily derived status and tag properties.
//!
//! A [`DatabaseSchema`] wraps the raw database object returned by the API and
//! answers the questions the CLI asks of it: which property is the kanban
//! status, which properties hold tags, what options they declare, and which
//! definition a user-supplied property name refers to.
//!
//! Property order follows the order of the raw `properties` object. The
//! status and tag lookups are computed on first use and cached for the life
//! of the schema.

use std::cell::OnceCell;

use serde_json::Value;

use crate::types::{PropertyDefinition, PropertyType};

/// Resolved schema of one database.
///
/// # Examples
///
/// ```
/// use notion_kanban_core::DatabaseSchema;
/// use serde_json::json;
///
/// let schema = DatabaseSchema::from_value("db1", json!({
///     "id": "db1",
///     "properties": {
///         "Name": {"type": "title", "title": {}},
///         "Stage": {"type": "status", "status": {"options": [{"name": "Todo"}, {"name": "Done"}]}},
///         "Tags": {"type": "multi_select", "multi_select": {"options": [{"name": "urgent"}]}}
///     }
/// }));
///
/// assert_eq!(schema.status_property_name(), Some("Stage"));
/// assert_eq!(schema.tag_property_names(), ["Tags"]);
/// assert_eq!(schema.status_options(), vec!["Todo", "Done"]);
/// assert!(schema.find_property_by_name("stage").is_some());
/// ```
#[derive(Debug)]
pub struct DatabaseSchema {
    database_id: String,
    raw: Value,
    properties: Vec<PropertyDefinition>,
    status_property: OnceCell<Option<String>>,
    tag_properties: OnceCell<Vec<String>>,
}

impl DatabaseSchema {
    /// Builds a schema from the raw database object.
    ///
    /// A missing or non-object `properties` member yields a schema with no
    /// properties; construction never fails.
    pub fn from_value(database_id: impl Into<String>, raw: Value) -> Self {
        let properties = raw
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, def)| PropertyDefinition::new(name.clone(), def.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_id: database_id.into(),
            raw,
            properties,
            status_property: OnceCell::new(),
            tag_properties: OnceCell::new(),
        }
    }

    /// Identifier the schema was resolved for.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Raw database object as returned by the API.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The `id` reported by the API, if any.
    pub fn id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }

    /// Plain text of the first run of the database title, or `""`.
    pub fn title(&self) -> &str {
        self.raw
            .get("title")
            .and_then(Value::as_array)
            .and_then(|runs| runs.first())
            .and_then(|run| run.get("plain_text"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// All property definitions in schema order.
    pub fn properties(&self) -> &[PropertyDefinition] {
        &self.properties
    }

    /// Name of the first property whose type is `status`.
    ///
    /// Later status-typed properties are ignored. The answer, including
    /// `None`, is computed once.
    pub fn status_property_name(&self) -> Option<&str> {
        self.status_property
            .get_or_init(|| {
                self.properties
                    .iter()
                    .find(|def| def.is(&PropertyType::Status))
                    .map(|def| def.name.clone())
            })
            .as_deref()
    }

    /// Names of all `multi_select` properties, in schema order.
    ///
    /// Computed once; an empty result is cached like any other.
    pub fn tag_property_names(&self) -> &[String] {
        self.tag_properties.get_or_init(|| {
            self.properties
                .iter()
                .filter(|def| def.is(&PropertyType::MultiSelect))
                .map(|def| def.name.clone())
                .collect()
        })
    }

    /// Option names declared by the status property, or empty if there is
    /// no status property.
    pub fn status_options(&self) -> Vec<String> {
        self.status_property_name()
            .and_then(|name| self.property(name))
            .map(|def| def.option_names(&PropertyType::Status))
            .unwrap_or_default()
    }

    /// Option names declared by the multi-select property `property`.
    ///
    /// An unknown property yields an empty list.
    pub fn tag_options(&self, property: &str) -> Vec<String> {
        self.property(property)
            .map(|def| def.option_names(&PropertyType::MultiSelect))
            .unwrap_or_default()
    }

    /// Case-insensitive lookup of a property definition by name.
    ///
    /// When several names collide case-insensitively the first in schema
    /// order wins.
    pub fn find_property_by_name(&self, name: &str) -> Option<&PropertyDefinition> {
        let wanted = name.to_lowercase();
        self.properties
            .iter()
            .find(|def| def.name.to_lowercase() == wanted)
    }

    /// Exact-name lookup.
    fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|def| def.name == name)
    }
}

//! Kanban operations exposed to the CLI.
//!
//! Each operation resolves the database schema through the caller's
//! [`SchemaCache`] (fetching it at most once per cache), performs a single API
//! call, and returns a serializable result. Errors are returned, never
//! printed; turning them into the output envelope is the caller's job.

use indexmap::IndexMap;
use notion_kanban_core::{
    DatabaseSchema, FieldValue, PropertyType, SchemaCache, build_filter, normalize_properties,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::api::{NotionApi, Page, QueryRequest};
use crate::error::{KanbanError, Result};

/// A page with its properties normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: Option<String>,
    pub created_time: Option<String>,
    pub last_edited_time: Option<String>,
    pub archived: Option<bool>,
    pub properties: IndexMap<String, FieldValue>,
    pub url: Option<String>,
}

impl Record {
    pub fn from_page(page: Page) -> Self {
        Self {
            properties: normalize_properties(&page.properties),
            id: page.id,
            created_time: page.created_time,
            last_edited_time: page.last_edited_time,
            archived: page.archived,
            url: page.url,
        }
    }

    /// Decodes a raw page object.
    ///
    /// # Errors
    ///
    /// Returns [`Json`](KanbanError::Json) if the object is not page-shaped.
    pub fn from_value(raw: Value) -> Result<Self> {
        let page: Page = serde_json::from_value(raw)?;
        Ok(Self::from_page(page))
    }
}

/// Result of [`update_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: String,
    pub property: String,
}

/// Query arguments. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Status to match exactly.
    pub status: Option<String>,
    /// Comma-separated tags that must all be present.
    pub tags: Option<String>,
    /// `key=value` filter on any property.
    pub filter: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Continuation token from a previous query.
    pub start_cursor: Option<String>,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage {
    pub items: Vec<Record>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Result of [`list_status_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOptions {
    pub property_name: String,
    pub options: Vec<String>,
}

/// Result of [`list_tag_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOptions {
    pub properties: Vec<String>,
    pub tags_by_property: IndexMap<String, Vec<String>>,
}

/// A property in [`SimplifiedSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplifiedProperty {
    #[serde(rename = "type")]
    pub kind: Option<PropertyType>,
    /// Declared options, only for `select`, `multi_select` and `status`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Compact view of a database schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplifiedSchema {
    pub id: Option<String>,
    pub title: String,
    pub properties: IndexMap<String, SimplifiedProperty>,
}

fn resolve_schema<'c>(
    api: &dyn NotionApi,
    cache: &'c mut SchemaCache,
    database_id: &str,
) -> Result<&'c DatabaseSchema> {
    cache.resolve(database_id, |id| api.get_database(id))
}

/// Fetches one page and normalizes its properties.
pub fn read_item(api: &dyn NotionApi, item_id: &str) -> Result<Record> {
    Record::from_value(api.get_page(item_id)?)
}

/// Sets the status property of a page.
///
/// # Errors
///
/// - [`MissingStatusProperty`](KanbanError::MissingStatusProperty) if the
///   database has no status property.
/// - [`InvalidStatus`](KanbanError::InvalidStatus) if the property declares
///   options and `status` is not one of them; no update is sent.
pub fn update_status(
    api: &dyn NotionApi,
    cache: &mut SchemaCache,
    database_id: &str,
    item_id: &str,
    status: &str,
) -> Result<StatusUpdate> {
    let schema = resolve_schema(api, cache, database_id)?;
    let property = schema
        .status_property_name()
        .ok_or(KanbanError::MissingStatusProperty)?
        .to_string();

    let options = schema.status_options();
    if !options.is_empty() && !options.iter().any(|option| option == status) {
        return Err(KanbanError::InvalidStatus {
            value: status.to_string(),
            available_options: options,
        });
    }

    let mut patch = Map::new();
    patch.insert(property.clone(), json!({ "status": { "name": status } }));
    api.update_page(item_id, Value::Object(patch))?;
    info!(item_id, %property, status, "Updated status");

    Ok(StatusUpdate {
        id: item_id.to_string(),
        status: status.to_string(),
        property,
    })
}

/// Runs a single-page query with the filter built from `options`.
pub fn query_items(
    api: &dyn NotionApi,
    cache: &mut SchemaCache,
    database_id: &str,
    options: &QueryOptions,
) -> Result<QueryPage> {
    let schema = resolve_schema(api, cache, database_id)?;
    let filter = build_filter(
        schema,
        options.status.as_deref(),
        options.tags.as_deref(),
        options.filter.as_deref(),
    );
    debug!(database_id, ?filter, "Built query filter");

    let request = QueryRequest {
        filter,
        sorts: None,
        start_cursor: options.start_cursor.clone(),
        page_size: options.limit,
    };
    let response = api.query_database(database_id, &request)?;

    let items = response
        .results
        .into_iter()
        .map(Record::from_value)
        .collect::<Result<Vec<_>>>()?;

    Ok(QueryPage {
        items,
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}

/// Lists the options of the status property.
///
/// # Errors
///
/// [`MissingStatusProperty`](KanbanError::MissingStatusProperty) if there is
/// no status property or it declares no options.
pub fn list_status_options(
    api: &dyn NotionApi,
    cache: &mut SchemaCache,
    database_id: &str,
) -> Result<StatusOptions> {
    let schema = resolve_schema(api, cache, database_id)?;
    let property_name = schema
        .status_property_name()
        .ok_or(KanbanError::MissingStatusProperty)?;

    let options = schema.status_options();
    if options.is_empty() {
        return Err(KanbanError::MissingStatusProperty);
    }

    Ok(StatusOptions {
        property_name: property_name.to_string(),
        options,
    })
}

/// Lists the options of every multi-select property, in schema order.
///
/// # Errors
///
/// [`MissingTagProperties`](KanbanError::MissingTagProperties) if the
/// database has no multi-select property.
pub fn list_tag_options(
    api: &dyn NotionApi,
    cache: &mut SchemaCache,
    database_id: &str,
) -> Result<TagOptions> {
    let schema = resolve_schema(api, cache, database_id)?;
    let properties = schema.tag_property_names().to_vec();
    if properties.is_empty() {
        return Err(KanbanError::MissingTagProperties);
    }

    let tags_by_property = properties
        .iter()
        .map(|name| (name.clone(), schema.tag_options(name)))
        .collect();

    Ok(TagOptions {
        properties,
        tags_by_property,
    })
}

/// Summarizes the schema: property types plus options for choice types.
pub fn simplified_schema(
    api: &dyn NotionApi,
    cache: &mut SchemaCache,
    database_id: &str,
) -> Result<SimplifiedSchema> {
    let schema = resolve_schema(api, cache, database_id)?;

    let properties = schema
        .properties()
        .iter()
        .map(|def| {
            let options = def
                .kind
                .as_ref()
                .filter(|kind| kind.has_options())
                .map(|kind| def.option_names(kind));
            (
                def.name.clone(),
                SimplifiedProperty {
                    kind: def.kind.clone(),
                    options,
                },
            )
        })
        .collect();

    Ok(SimplifiedSchema {
        id: schema.id().map(String::from),
        title: schema.title().to_string(),
        properties,
    })
}

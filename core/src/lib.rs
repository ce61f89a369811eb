//! Schema-driven filtering and value normalization for Notion kanban boards.
//!
//! This crate holds the I/O-free logic of the `notion-tool` CLI:
//!
//! - [`DatabaseSchema`]: wraps a raw database object and discovers the
//!   status property, the tag (multi-select) properties and their options.
//! - [`SchemaCache`]: keeps one resolved schema per database identifier so a
//!   schema is fetched at most once per cache lifetime.
//! - [`build_filter`]: turns `--status`, `--tags` and `--filter key=value`
//!   arguments into the API's filter grammar ([`Filter`]).
//! - [`normalize`]: reduces a page property value to a [`FieldValue`].
//!
//! # Example
//!
//! ```
//! use notion_kanban_core::*;
//! use serde_json::json;
//!
//! let mut cache = SchemaCache::new();
//! let schema = cache
//!     .resolve("db1", |_| {
//!         Ok::<_, std::convert::Infallible>(json!({"properties": {
//!             "Stage": {"type": "status", "status": {"options": [{"name": "Done"}]}},
//!             "Tags": {"type": "multi_select", "multi_select": {"options": []}}
//!         }}))
//!     })
//!     .unwrap();
//!
//! let filter = build_filter(schema, Some("Done"), None, None).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&filter).unwrap(),
//!     json!({"property": "Stage", "status": {"equals": "Done"}})
//! );
//!
//! let value = normalize(&json!({"type": "checkbox", "checkbox": true}));
//! assert_eq!(value, FieldValue::Bool(true));
//! ```

mod cache;
mod filter;
mod normalize;
mod schema;
mod types;

pub use cache::SchemaCache;
pub use filter::{
    Condition, Filter, FilterError, build_filter, custom_filter, status_filter, tags_filter,
};
pub use normalize::{FieldValue, normalize, normalize_datetime, normalize_properties};
pub use schema::DatabaseSchema;
pub use types::{PropertyDefinition, PropertyType};

//! Notion API access and kanban operations for the `notion-tool` CLI.
//!
//! This crate connects the pure logic in [`notion_kanban_core`] to the
//! Notion HTTP API:
//!
//! - [`NotionApi`]: the four blocking API calls the operations need, with
//!   [`HttpClient`] as the network implementation.
//! - [`ClientConfig`] / [`ClientSettings`]: credential and endpoint
//!   configuration.
//! - [`ops`]: read, update-status, query, list-status, list-tags and schema
//!   operations, each returning a [`Result`].
//! - [`Envelope`]: the `{success, data, error}` wrapper printed by the CLI.
//!
//! # Quick start
//!
//! ```no_run
//! use notion_kanban_client::{ClientConfig, ClientSettings, HttpClient, SchemaCache, ops};
//!
//! let config = ClientConfig::from_env(&ClientSettings::default()).unwrap();
//! let api = HttpClient::new(&config).unwrap();
//! let mut cache = SchemaCache::new();
//!
//! let options = ops::list_status_options(&api, &mut cache, "0509def271a84947b6a55ddf1caee4df").unwrap();
//! println!("{} status options", options.options.len());
//! ```

mod api;
mod config;
mod error;
mod http;
pub mod ops;
mod response;

pub use api::{NotionApi, Page, QueryRequest, QueryResponse};
pub use config::{
    API_KEY_ENV, ClientConfig, ClientSettings, DEFAULT_API_VERSION, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::{ErrorPayload, KanbanError, Result};
pub use http::HttpClient;
pub use notion_kanban_core::SchemaCache;
pub use response::Envelope;

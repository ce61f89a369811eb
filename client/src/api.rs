//! The API surface the operations depend on.
//!
//! [`NotionApi`] is the seam between the kanban operations and the network.
//! [`HttpClient`](crate::HttpClient) implements it over HTTPS; tests supply
//! in-memory implementations.

use notion_kanban_core::Filter;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Blocking calls to the four endpoints the CLI uses.
///
/// Implementations report non-success responses as
/// [`KanbanError::Api`](crate::KanbanError::Api) and never retry.
pub trait NotionApi {
    /// `GET /pages/{page_id}`
    fn get_page(&self, page_id: &str) -> Result<Value>;

    /// `GET /databases/{database_id}`
    fn get_database(&self, database_id: &str) -> Result<Value>;

    /// `POST /databases/{database_id}/query`
    fn query_database(&self, database_id: &str, query: &QueryRequest) -> Result<QueryResponse>;

    /// `PATCH /pages/{page_id}` with `{"properties": properties}`.
    fn update_page(&self, page_id: &str, properties: Value) -> Result<Value>;
}

/// Body of a database query. Absent members are not sent.
///
/// # Examples
///
/// ```
/// use notion_kanban_client::QueryRequest;
/// use serde_json::json;
///
/// let request = QueryRequest { page_size: Some(5), ..Default::default() };
/// assert_eq!(serde_json::to_value(&request).unwrap(), json!({"page_size": 5}));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// One page of query results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub has_more: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// The members of a page object the CLI reports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub id: Option<String>,
    pub created_time: Option<String>,
    pub last_edited_time: Option<String>,
    pub archived: Option<bool>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use notion_kanban_core::Condition;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_query_request_serializes_present_members_only() {
        let request = QueryRequest {
            filter: Some(Filter::property(
                "Stage",
                Condition::Status {
                    equals: "Done".into(),
                },
            )),
            start_cursor: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "filter": {"property": "Stage", "status": {"equals": "Done"}},
                "start_cursor": "abc"
            })
        );
        assert_eq!(
            serde_json::to_value(QueryRequest::default()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_query_response_tolerates_missing_members() {
        let response: QueryResponse = serde_json::from_value(json!({"object": "list"})).unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.next_cursor, None);
        assert!(!response.has_more);
    }

    #[test]
    fn test_query_response_null_members() {
        let response: QueryResponse = serde_json::from_value(json!({
            "results": [{"id": "p1"}],
            "next_cursor": null,
            "has_more": null
        }))
        .unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(!response.has_more);

        let response: QueryResponse =
            serde_json::from_value(json!({"next_cursor": "c2", "has_more": true})).unwrap();
        assert_eq!(response.next_cursor.as_deref(), Some("c2"));
        assert!(response.has_more);
    }

    #[test]
    fn test_page_ignores_unknown_members() {
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "p1",
            "archived": false,
            "properties": {"Name": {"type": "title", "title": []}},
            "parent": {"database_id": "db"}
        }))
        .unwrap();
        assert_eq!(page.id.as_deref(), Some("p1"));
        assert_eq!(page.archived, Some(false));
        assert_eq!(page.url, None);
        assert_eq!(page.properties.len(), 1);
    }
}

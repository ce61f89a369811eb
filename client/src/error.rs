//! Error types for kanban operations.
//!
//! Covers every failure an operation can report: API errors carrying an HTTP
//! status, schema problems, invalid status values, configuration problems and
//! lower-level transport or serialization failures.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the API or running an operation.
#[derive(Debug, Error)]
pub enum KanbanError {
    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        /// Decoded error body, when the response carried JSON.
        body: Option<Value>,
    },

    /// The database has no status property.
    #[error("No status property found in database")]
    MissingStatusProperty,

    /// The database has no multi-select property.
    #[error("No tag properties found in database")]
    MissingTagProperties,

    /// The requested status is not one of the declared options.
    #[error("Invalid status '{value}'")]
    InvalidStatus {
        value: String,
        available_options: Vec<String>,
    },

    /// Missing credential or unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, TLS, timeout or body decoding failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KanbanError {
    /// HTTP status of an [`Api`](KanbanError::Api) error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured form of the error for the JSON envelope.
    pub fn to_payload(&self) -> ErrorPayload {
        let available_options = match self {
            Self::InvalidStatus {
                available_options, ..
            } => Some(available_options.clone()),
            _ => None,
        };
        ErrorPayload {
            message: self.to_string(),
            status_code: self.status_code(),
            available_options,
        }
    }
}

/// Caller-visible error description.
///
/// `status_code` is only present for API errors and `available_options`
/// only for invalid status values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_options: Option<Vec<String>>,
}

/// Convenience alias for results with [`KanbanError`].
pub type Result<T> = std::result::Result<T, KanbanError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_api_error_payload_carries_status() {
        let err = KanbanError::Api {
            status: 404,
            message: "Could not find database".into(),
            body: None,
        };
        assert_eq!(err.to_string(), "Could not find database");
        assert_eq!(
            serde_json::to_value(err.to_payload()).unwrap(),
            json!({"message": "Could not find database", "status_code": 404})
        );
    }

    #[test]
    fn test_invalid_status_payload_lists_options() {
        let err = KanbanError::InvalidStatus {
            value: "Blocked".into(),
            available_options: vec!["Todo".into(), "Done".into()],
        };
        assert_eq!(
            serde_json::to_value(err.to_payload()).unwrap(),
            json!({"message": "Invalid status 'Blocked'", "available_options": ["Todo", "Done"]})
        );
    }

    #[test]
    fn test_other_errors_have_message_only() {
        let payload = KanbanError::MissingStatusProperty.to_payload();
        assert_eq!(payload.status_code, None);
        assert_eq!(payload.available_options, None);
        assert_eq!(payload.message, "No status property found in database");
    }
}

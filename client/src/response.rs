//! The `{success, data, error}` envelope printed by the CLI.

use serde::Serialize;

use crate::error::{ErrorPayload, Result};

/// Uniform JSON wrapper around an operation result.
///
/// Exactly one of `data` and `error` is non-null; both keys are always
/// present in the serialized form.
///
/// # Examples
///
/// ```
/// use notion_kanban_client::{Envelope, KanbanError};
/// use serde_json::json;
///
/// let ok = Envelope::from_result(Ok::<_, KanbanError>(json!({"id": "p1"})));
/// assert_eq!(
///     serde_json::to_value(&ok).unwrap(),
///     json!({"success": true, "data": {"id": "p1"}, "error": null})
/// );
///
/// let failed = Envelope::<()>::from_result(Err(KanbanError::MissingTagProperties));
/// assert!(!failed.success);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorPayload>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ErrorPayload) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_payload()),
        }
    }

    /// Pretty-printed JSON, two-space indented.
    ///
    /// # Errors
    ///
    /// Returns [`Json`](crate::KanbanError::Json) if `data` fails to
    /// serialize.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::KanbanError;

    #[test]
    fn test_failure_envelope_shape() {
        let envelope = Envelope::<Vec<String>>::from_result(Err(KanbanError::Api {
            status: 401,
            message: "API token is invalid.".into(),
            body: None,
        }));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "data": null,
                "error": {"message": "API token is invalid.", "status_code": 401}
            })
        );
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let text = Envelope::success(json!({"a": 1})).to_json_pretty().unwrap();
        assert!(text.starts_with("{\n  \"success\": true"));
    }
}

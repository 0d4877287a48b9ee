//! The transport-independent response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome tag carried in the envelope's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// The operation succeeded
    Success,
    /// The operation failed
    Failed,
    /// Informational notice
    Info,
    /// Non-fatal warning
    Warning,
}

/// Accumulated response fields
///
/// Serializes with the keys `title`, `message`, `error`, `type`, `statusCode`
/// and `data`, omitting anything empty or unset. The redirect route is never
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Optional heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Informational messages in call order
    #[serde(rename = "message", default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,

    /// Error messages in call order
    #[serde(rename = "error", default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Outcome tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseKind>,

    /// Suggested transport status
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Arbitrary payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Redirect target; its presence selects redirect rendering
    #[serde(skip)]
    pub route: Option<String>,
}

/// Values accepted by the appending `message`/`error` setters
///
/// `None` contributes nothing.
pub trait IntoMessages {
    /// Messages to append, in order
    fn into_messages(self) -> Vec<String>;
}

impl IntoMessages for &str {
    fn into_messages(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoMessages for String {
    fn into_messages(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoMessages for &String {
    fn into_messages(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T: Into<String>> IntoMessages for Vec<T> {
    fn into_messages(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<String>, const N: usize> IntoMessages for [T; N] {
    fn into_messages(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: IntoMessages> IntoMessages for Option<T> {
    fn into_messages(self) -> Vec<String> {
        self.map(IntoMessages::into_messages).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_envelope_serializes_to_empty_object() {
        let value = serde_json::to_value(ResponseEnvelope::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_wire_keys() {
        let envelope = ResponseEnvelope {
            title: Some("Posts".into()),
            messages: vec!["saved".into()],
            errors: vec!["title too long".into()],
            kind: Some(ResponseKind::Failed),
            status_code: Some(422),
            data: Some(json!({"id": 1})),
            route: Some("/posts".into()),
        };

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "title": "Posts",
                "message": ["saved"],
                "error": ["title too long"],
                "type": "failed",
                "statusCode": 422,
                "data": {"id": 1},
            })
        );
    }

    #[test]
    fn test_into_messages_variants() {
        assert_eq!("a".into_messages(), vec!["a"]);
        assert_eq!(vec!["a", "b"].into_messages(), vec!["a", "b"]);
        assert_eq!(["x".to_string()].into_messages(), vec!["x"]);
        assert!(None::<&str>.into_messages().is_empty());
        assert_eq!(Some("y").into_messages(), vec!["y"]);
    }
}

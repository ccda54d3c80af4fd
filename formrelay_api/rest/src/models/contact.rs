use formrelay_models::contact::ContactSubmission;
use serde::{de::IgnoredAny, Deserialize};

#[derive(Debug, Deserialize)]
pub struct ApiContactMessage {
    #[serde(default)]
    pub name: Option<FieldValue>,
    #[serde(default)]
    pub email: Option<FieldValue>,
    #[serde(default)]
    pub message: Option<FieldValue>,
}

/// A single submitted field. Clients are not trusted to send strings, so
/// scalars are stringified and anything else is treated as empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Other(
        #[allow(dead_code, reason = "only consumed to skip the value")] IgnoredAny,
    ),
}

impl From<ApiContactMessage> for ContactSubmission {
    fn from(value: ApiContactMessage) -> Self {
        Self {
            name: field_to_string(value.name),
            email: field_to_string(value.email),
            message: field_to_string(value.message),
        }
    }
}

fn field_to_string(value: Option<FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(text)) => text,
        Some(FieldValue::Number(number)) => number.to_string(),
        Some(FieldValue::Bool(value)) => value.to_string(),
        Some(FieldValue::Other(_)) | None => String::new(),
    }
}

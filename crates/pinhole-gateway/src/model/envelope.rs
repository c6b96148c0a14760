use serde::Serialize;
use std::collections::BTreeMap;

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Human-readable part of a response: a sentence, or per-field validation
/// messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Fields(FieldErrors),
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_owned())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<FieldErrors> for Message {
    fn from(fields: FieldErrors) -> Self {
        Message::Fields(fields)
    }
}

/// Body shape shared by every JSON response.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
        }
    }

    pub fn data_with_message(data: T, message: impl Into<Message>) -> Self {
        Self {
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<Message>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
        }
    }
}

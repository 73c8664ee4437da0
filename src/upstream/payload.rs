//! Upstream error payloads.
//!
//! The upstream API is inconsistent about how it reports failures. Bodies are
//! parsed once into [`ErrorPayload`] so the normalizer can match on a closed set
//! of shapes instead of probing loose JSON.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Status values a payload declares about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredStatus {
    /// Explicit `statusCode` field.
    pub status_code: Option<u16>,
    /// Generic `status` field, as carried by problem-details bodies.
    pub status: Option<u16>,
}

impl DeclaredStatus {
    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            status_code: map.get("statusCode").and_then(as_status),
            status: map.get("status").and_then(as_status),
        }
    }

    pub fn resolve(&self) -> Option<u16> {
        self.status_code.or(self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// Plain string body, JSON-encoded or raw text.
    Text(String),
    /// Validation problem with a non-empty `field -> messages` mapping.
    Validation {
        errors: BTreeMap<String, Vec<String>>,
        status: DeclaredStatus,
    },
    /// Any other object: problem details, `{ message }`, or something unrecognised.
    Problem {
        detail: Option<String>,
        title: Option<String>,
        message: Option<String>,
        status: DeclaredStatus,
    },
    /// Empty body, transport failure, or JSON that is neither string nor object.
    Unknown,
}

impl ErrorPayload {
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::Unknown;
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::String(text)) => Self::Text(text),
            Ok(Value::Object(map)) => Self::from_object(&map),
            Ok(_) => Self::Unknown,
            Err(_) => Self::Text(String::from_utf8_lossy(body).into_owned()),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let status = DeclaredStatus::from_object(map);

        if let Some(Value::Object(fields)) = map.get("errors") {
            let errors: BTreeMap<String, Vec<String>> = fields
                .iter()
                .filter_map(|(field, messages)| {
                    let messages = field_messages(messages);
                    (!messages.is_empty()).then(|| (field.clone(), messages))
                })
                .collect();

            if !errors.is_empty() {
                return Self::Validation { errors, status };
            }
        }

        Self::Problem {
            detail: non_empty_str(map.get("detail")),
            title: non_empty_str(map.get("title")),
            message: non_empty_str(map.get("message")),
            status,
        }
    }

    pub fn declared_status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Problem { status, .. } => status.resolve(),
            Self::Text(_) | Self::Unknown => None,
        }
    }
}

fn as_status(value: &Value) -> Option<u16> {
    value.as_u64().and_then(|n| u16::try_from(n).ok())
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn field_messages(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

//! Error normalizer.
//!
//! Turns any [`UpstreamFailure`] into the stable `{ statusCode, message }`
//! envelope. It never fails and has no side effects besides logging; clearing
//! the session on a 401 is left to the caller.

use crate::{
    upstream::{ErrorPayload, UpstreamFailure},
    utils::{ErrorKind, NormalizedError},
};

/// Generic fallback used when a call site has nothing more specific.
pub const DEFAULT_FALLBACK: &str = "Request failed";

pub fn normalize(failure: &UpstreamFailure, fallback: &str, dev_mode: bool) -> NormalizedError {
    let normalized = resolve(failure, fallback);

    match normalized.kind() {
        ErrorKind::UpstreamServerError => tracing::error!(
            status = normalized.status_code,
            cause = failure.cause.as_deref().unwrap_or("-"),
            "API error: {failure}"
        ),
        _ if dev_mode => tracing::warn!(status = normalized.status_code, "Handled API error"),
        _ => {}
    }

    normalized
}

fn resolve(failure: &UpstreamFailure, fallback: &str) -> NormalizedError {
    let status_code = failure
        .status
        .or_else(|| failure.payload.declared_status())
        .unwrap_or(500);

    let message = extract_message(&failure.payload);

    let message = if status_code == 401 {
        message.unwrap_or_else(|| "Unauthorized".to_string())
    } else {
        message.unwrap_or_else(|| fallback.to_string())
    };

    NormalizedError {
        status_code,
        message,
    }
}

fn extract_message(payload: &ErrorPayload) -> Option<String> {
    match payload {
        ErrorPayload::Text(text) if !text.trim().is_empty() => Some(text.clone()),
        ErrorPayload::Validation { errors, .. } => Some(
            errors
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ErrorPayload::Problem {
            detail,
            title,
            message,
            ..
        } => detail.clone().or_else(|| title.clone()).or_else(|| message.clone()),
        ErrorPayload::Text(_) | ErrorPayload::Unknown => None,
    }
}

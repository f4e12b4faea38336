//! Error taxonomy for the API client.
//!
//! The backend reports failures in several shapes: `{"error": "..."}` from
//! its permission checks, `{"detail": "..."}` from the auth layer, and
//! field-to-messages maps from serializer validation. [`classify`] probes
//! the body in that order so screens can always surface the first
//! structured message the server offered.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: DNS, refused connection, timeout. There is no
    /// server message to show for these.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 401. The access token is missing, expired, or revoked; the
    /// app reacts by attempting one token refresh before signing out.
    #[error("{0}")]
    Unauthorized(String),

    /// HTTP 403. The server refused the operation for this account.
    #[error("{0}")]
    Forbidden(String),

    /// HTTP 400 carrying a field-to-messages map from the validators.
    #[error("{}", .0.summary())]
    Validation(FieldErrors),

    /// Any other non-success response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success response whose body did not match the documented shape.
    #[error("unexpected response from the server: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The server-provided message, when the response carried one. Screens
    /// fall back to their own generic wording when this is `None`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Server { message: msg, .. } => Some(msg.as_str()),
            ApiError::Validation(_) | ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Validation field map, when this is a [`ApiError::Validation`].
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Field-level validation messages keyed by serializer field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// First message reported for `field`, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
    }

    /// First message for the first of `fields` that has one. Screens use
    /// this to reproduce their priority order (e.g. email before username).
    pub fn first_of(&self, fields: &[&str]) -> Option<&str> {
        fields.iter().find_map(|f| self.first(f))
    }

    /// One line for banners and logs: the first field with its message.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .find_map(|(field, msgs)| msgs.first().map(|m| format!("{field}: {m}")))
            .unwrap_or_else(|| "validation failed".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map a non-success response to the best available `ApiError`.
///
/// Message priority: `error` key, then `detail` key, then the field map,
/// then a bare JSON string, then the raw body, then the status line.
pub(crate) fn classify(status: StatusCode, body: &str) -> ApiError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    let mut message = None;
    let mut fields = FieldErrors::default();

    match &parsed {
        Some(serde_json::Value::Object(map)) => {
            if let Some(serde_json::Value::String(s)) = map.get("error") {
                message = Some(s.clone());
            } else if let Some(serde_json::Value::String(s)) = map.get("detail") {
                message = Some(s.clone());
            } else {
                for (key, value) in map {
                    let msgs: Vec<String> = match value {
                        serde_json::Value::Array(items) => items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect(),
                        serde_json::Value::String(s) => vec![s.clone()],
                        _ => Vec::new(),
                    };
                    if !msgs.is_empty() {
                        fields.0.insert(key.clone(), msgs);
                    }
                }
            }
        }
        Some(serde_json::Value::String(s)) => message = Some(s.clone()),
        _ => {}
    }

    let fallback = || {
        let trimmed = body.trim();
        if !trimmed.is_empty() && parsed.is_none() {
            trimmed.to_string()
        } else {
            format!(
                "server error ({})",
                status.canonical_reason().unwrap_or("unknown")
            )
        }
    };

    match status {
        StatusCode::UNAUTHORIZED => {
            ApiError::Unauthorized(message.unwrap_or_else(|| "authentication required".into()))
        }
        StatusCode::FORBIDDEN => ApiError::Forbidden(message.unwrap_or_else(fallback)),
        StatusCode::BAD_REQUEST if !fields.is_empty() => ApiError::Validation(fields),
        _ => {
            let message = message
                .or_else(|| (!fields.is_empty()).then(|| fields.summary()))
                .unwrap_or_else(fallback);
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

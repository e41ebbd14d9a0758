use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Fallback shown when the server gave no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Session expired or not authorized")]
    Unauthorized,
    #[error("Request rejected: {0}")]
    Rejected(ApiErrorBody),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Session storage error: {0}")]
    Session(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Session(e.to_string())
    }
}

/// Server error payload normalized at the HTTP boundary.
///
/// The API answers with a bare string, a list of strings, or an object
/// keyed by field name (with `detail` and `non_field_errors` as the
/// form-wide keys). Downstream code only ever sees this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub field_errors: BTreeMap<String, String>,
    pub general_error: Option<String>,
}

impl ApiErrorBody {
    pub fn general(msg: impl Into<String>) -> Self {
        Self {
            field_errors: BTreeMap::new(),
            general_error: Some(msg.into()),
        }
    }

    pub fn from_payload(payload: &Value) -> Self {
        let mut body = Self::default();
        match payload {
            Value::String(s) => body.general_error = non_empty(s),
            Value::Array(items) => body.general_error = first_message(items),
            Value::Object(map) => {
                for (key, value) in map {
                    let msg = match value {
                        Value::String(s) => non_empty(s),
                        Value::Array(items) => first_message(items),
                        Value::Object(_) => Some(value.to_string()),
                        _ => None,
                    };
                    let Some(msg) = msg else { continue };
                    match key.as_str() {
                        "detail" | "non_field_errors" => {
                            body.general_error.get_or_insert(msg);
                        }
                        _ => {
                            body.field_errors.insert(key.clone(), msg);
                        }
                    }
                }
            }
            _ => {}
        }
        body
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.general_error.is_none()
    }

    /// Best single line for a form: the general error, else the first
    /// field error, else `fallback`.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.general_error
            .as_deref()
            .or_else(|| self.field_errors.values().next().map(String::as_str))
            .unwrap_or(fallback)
    }
}

impl std::fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(general) = &self.general_error {
            parts.push(general.clone());
        }
        for (field, msg) in &self.field_errors {
            parts.push(format!("{}: {}", field, msg));
        }
        if parts.is_empty() {
            write!(f, "{}", GENERIC_FAILURE)
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn first_message(items: &[Value]) -> Option<String> {
    items.iter().find_map(|item| item.as_str().and_then(non_empty))
}

/// What a form shows inline after a submit attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Client-side guard refused to submit; nothing was sent.
    #[error("{0}")]
    Blocked(String),
    /// Input could not be parsed or has the wrong shape.
    #[error("{0}")]
    Invalid(String),
    /// The server validated and refused the request.
    #[error("{0}")]
    Rejected(String),
    /// Network or unexpected failure; the user may resubmit.
    #[error("{0}")]
    Failed(String),
    /// Session ended; the caller must return to the entry view.
    #[error("Session ended. Please log in again.")]
    Redirect,
}

impl FormError {
    pub fn is_redirect(&self) -> bool {
        matches!(self, FormError::Redirect)
    }
}

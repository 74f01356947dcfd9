//! # Errors
//!
//! Parsing query parameters never fails: malformed values degrade to
//! documented defaults. The one fallible surface is decoding a trusted filter
//! tree from JSON, which reports a [`FilterError`].
//!
//! With the `axum` feature, [`FilterError`] converts into a `400 Bad Request`
//! response. The full error is logged through `tracing` while the client only
//! receives a short message.

use std::fmt;

/// Error decoding a filter tree from JSON.
#[derive(Debug)]
pub enum FilterError {
    /// The input was not valid JSON.
    Json(serde_json::Error),

    /// A value has no filter-tree meaning, e.g. `null` or a nested array.
    UnsupportedValue {
        /// Dotted path to the offending value
        path: String,
        /// JSON type that was found
        found: &'static str,
    },

    /// A logical connective key holds something other than filter objects.
    InvalidGroup {
        /// Dotted path to the connective key
        key: String,
    },
}

impl FilterError {
    pub(crate) fn unsupported(path: &str, value: &serde_json::Value) -> Self {
        Self::UnsupportedValue {
            path: path.to_string(),
            found: json_type_name(value),
        }
    }

    pub(crate) fn invalid_group(key: &str) -> Self {
        Self::InvalidGroup {
            key: key.to_string(),
        }
    }

    #[cfg(feature = "axum")]
    fn user_message(&self) -> &'static str {
        match self {
            Self::Json(_) => "Filter is not valid JSON",
            Self::UnsupportedValue { .. } | Self::InvalidGroup { .. } => "Filter has an unsupported shape",
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid filter JSON: {err}"),
            Self::UnsupportedValue { path, found } if path.is_empty() => {
                write!(f, "filter must be an object, found {found}")
            }
            Self::UnsupportedValue { path, found } => {
                write!(f, "unsupported {found} value at '{path}'")
            }
            Self::InvalidGroup { key } => {
                write!(f, "logical group '{key}' must hold an object or an array of objects")
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(feature = "axum")]
mod response {
    use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use serde::Serialize;

    use super::FilterError;

    #[derive(Serialize)]
    struct ErrorResponse {
        error: &'static str,
    }

    impl IntoResponse for FilterError {
        fn into_response(self) -> Response {
            tracing::debug!(error = %self, "rejecting filter");
            let body = ErrorResponse {
                error: self.user_message(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

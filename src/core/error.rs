use reqwest::{Method, StatusCode};
use std::fmt;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0} cannot be used as a base url")]
    CannotBeABase(Url),

    #[error("`{0}` cannot be used as a path segment")]
    InvalidKey(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(ApiError),

    #[error("conflict: {0}")]
    Conflict(ApiError),

    #[error("validation failed: {0}")]
    Validation(ApiError),

    #[error("{0}")]
    Status(ApiError),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Picks the variant for a non-2xx response.
    pub fn from_status(error: ApiError) -> Self {
        match error.status {
            StatusCode::NOT_FOUND => Error::NotFound(error),
            StatusCode::CONFLICT => Error::Conflict(error),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(error),
            _ => Error::Status(error),
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::NotFound(e) | Error::Conflict(e) | Error::Validation(e) | Error::Status(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport(e) => e.status(),
            other => other.api_error().map(|e| e.status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the server was unreachable or rejected the request, as
    /// opposed to answering with a body we could not decode.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_)) || self.api_error().is_some()
    }
}

/// A non-2xx response from GitLab.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl ApiError {
    /// GitLab reports failures as `{"message": ...}` or
    /// `{"error": ..., "error_description": ...}`; `message` may be a nested object.
    pub fn message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;

        if let Some(message) = value.get("message") {
            return Some(flatten_message(message));
        }

        let error = value.get("error")?;
        match value.get("error_description").and_then(|d| d.as_str()) {
            Some(description) => Some(format!("{}: {description}", flatten_message(error))),
            None => Some(flatten_message(error)),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.url, self.status)?;

        match self.message() {
            Some(message) => write!(f, " {message}"),
            None if !self.body.is_empty() => write!(f, " {}", self.body),
            None => Ok(()),
        }
    }
}

fn flatten_message(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(flatten_message).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", flatten_message(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.to_string(),
    }
}

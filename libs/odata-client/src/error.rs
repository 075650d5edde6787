use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the resource client.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// Builder misuse detected before any request was issued
    #[error(transparent)]
    Query(#[from] odata_query::Error),

    /// Resource name not present in the service root
    #[error("invalid resource name {0}")]
    UnknownResource(String),

    /// Service answered with a non-2xx status
    #[error("{message}")]
    OData {
        status: http::StatusCode,
        message: String,
    },

    /// Response content type not acceptable for the request
    #[error("invalid content type {0}")]
    InvalidContentType(String),

    /// `$count` response that is neither plain text nor JSON
    #[error("invalid content type for $count request {0}")]
    InvalidCountContentType(String),

    /// `$count` body was not an integer
    #[error("invalid $count response: {0}")]
    InvalidCount(String),

    /// Network, connection or protocol failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request did not complete in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body exceeded the configured size limit
    #[error("response body too large: limit {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Request URL could not be built
    #[error("invalid URL '{url}': {reason}")]
    InvalidUri { url: String, reason: String },

    /// JSON decoding failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Client configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Status code reported by the service, when the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            ClientError::OData { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error for a non-2xx response, taking the message from `error.message` in the body.
    #[must_use]
    pub fn from_status(status: http::StatusCode, body: Option<&serde_json::Value>) -> Self {
        let message = body
            .and_then(|value| value.pointer("/error/message"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(
                || format!("Request failed with status code {}", status.as_u16()),
                ToOwned::to_owned,
            );
        ClientError::OData { status, message }
    }
}

impl From<hyper_util::client::legacy::Error> for ClientError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        ClientError::Transport(Box::new(err))
    }
}

impl From<hyper::Error> for ClientError {
    fn from(err: hyper::Error) -> Self {
        ClientError::Transport(Box::new(err))
    }
}

impl From<figment::Error> for ClientError {
    fn from(err: figment::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

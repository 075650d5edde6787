//! Transport boundary between the query builder and the network.

use async_trait::async_trait;
use http::HeaderMap;
use odata_query::UrlPath;
use serde_json::Value;

use crate::error::ClientError;

/// Decoded response of a `GET` request.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    /// Payload with the `value` envelope already removed.
    pub data: Value,
    pub headers: HeaderMap,
}

impl TransportResponse {
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            data,
            headers: HeaderMap::new(),
        }
    }
}

/// Issues `GET` requests for rendered query paths such as `/Students?$top=2`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    /// Transport, protocol or service errors, propagated unmodified to the caller.
    async fn get(&self, path: &str) -> Result<TransportResponse, ClientError>;

    /// Issue the request for an accumulated path.
    ///
    /// Forwards the readable rendering to [`get`](Self::get) unless overridden.
    ///
    /// # Errors
    /// As [`get`](Self::get).
    async fn get_path(&self, path: &UrlPath) -> Result<TransportResponse, ClientError> {
        self.get(&path.to_string()).await
    }
}

/// True for paths addressing a `$count` segment, raw or percent-encoded.
#[must_use]
pub fn is_count_request(path: &str) -> bool {
    path.contains("$count") || path.contains("%24count")
}

/// Strip the `{"value": ...}` collection envelope, leaving other payloads untouched.
#[must_use]
pub fn unwrap_value(data: Value) -> Value {
    match data {
        Value::Object(mut map) if map.contains_key("value") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Check a response content type against what the request may return.
///
/// # Errors
/// [`ClientError::InvalidCountContentType`] for a `$count` response that is neither
/// `text/plain` nor JSON, [`ClientError::InvalidContentType`] for any other non-JSON
/// response.
pub fn check_content_type(path: &str, content_type: &str) -> Result<(), ClientError> {
    let essence = content_type.trim();
    if is_count_request(path) {
        if !essence.starts_with("text/plain") && !essence.starts_with("application/json") {
            return Err(ClientError::InvalidCountContentType(content_type.to_owned()));
        }
    } else if !essence.starts_with("application/json") {
        return Err(ClientError::InvalidContentType(content_type.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_detection() {
        assert!(is_count_request("/Students/$count"));
        assert!(is_count_request("/Students/%24count?$filter=x"));
        assert!(!is_count_request("/Students?$top=2"));
    }

    #[test]
    fn test_value_envelope_is_removed() {
        let data = json!({ "@odata.context": "x", "value": [1, 2] });
        assert_eq!(unwrap_value(data), json!([1, 2]));
        assert_eq!(unwrap_value(json!({ "Code": "LAM" })), json!({ "Code": "LAM" }));
        assert_eq!(unwrap_value(json!(5)), json!(5));
    }

    #[test]
    fn test_content_type_rules() {
        assert!(check_content_type("/Students", "application/json; odata.metadata=minimal").is_ok());
        assert!(matches!(
            check_content_type("/Students", "text/plain"),
            Err(ClientError::InvalidContentType(ct)) if ct == "text/plain"
        ));
        assert!(check_content_type("/Students/$count", "text/plain").is_ok());
        assert!(check_content_type("/Students/$count", "application/json").is_ok());
        let err = check_content_type("/Students/$count", "text/html").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid content type for $count request text/html"
        );
    }
}

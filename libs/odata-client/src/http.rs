//! hyper-based [`Transport`] implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue, USER_AGENT};
use http::{HeaderMap, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use odata_query::UrlPath;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::{Transport, TransportResponse, check_content_type, unwrap_value};

/// Media types accepted from the service.
pub const ACCEPT_MEDIA_TYPES: &str = "application/json,text/plain";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes of a non-2xx body inspected for an error message.
const ERROR_BODY_PREVIEW_LIMIT: usize = 64 * 1024;

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Sends `GET` requests relative to a configured service root.
///
/// Non-2xx responses become [`ClientError::OData`]; successful responses have their
/// content type checked and their `value` envelope removed.
#[derive(Clone)]
pub struct HttpTransport {
    client: HyperClient,
    base_url: Arc<str>,
    headers: HeaderMap,
    timeout: Duration,
    max_body_size: usize,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// # Errors
    /// [`ClientError::Config`] for an invalid configuration or header, or a plain
    /// HTTP service root while insecure HTTP is not allowed.
    /// [`ClientError::Transport`] when TLS initialization fails.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/');
        let scheme = base_url.split_once("://").map(|(scheme, _)| scheme);
        match scheme {
            Some("https") => {}
            Some("http") if config.allow_insecure_http => {
                tracing::warn!(
                    base_url,
                    "insecure HTTP enabled; use only for testing with mock servers"
                );
            }
            Some(other) => {
                return Err(ClientError::Config(format!(
                    "URL scheme '{other}' not allowed for service root {base_url}"
                )));
            }
            None => {
                return Err(ClientError::InvalidUri {
                    url: config.base_url.clone(),
                    reason: "missing scheme".to_owned(),
                });
            }
        }

        let headers = build_headers(config)?;
        let https = build_https_connector(config.allow_insecure_http)?;
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build::<_, Full<Bytes>>(https);

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
            headers,
            timeout: config.timeout,
            max_body_size: config.max_body_size,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute request URI for a rendered query path.
    ///
    /// # Errors
    /// [`ClientError::InvalidUri`] when the result is not a valid URI.
    pub fn request_uri(&self, path: &str) -> Result<Uri, ClientError> {
        self.absolute_uri(&encode_for_wire(path))
    }

    fn absolute_uri(&self, target: &str) -> Result<Uri, ClientError> {
        let url = format!("{}{target}", self.base_url);
        url.parse::<Uri>().map_err(|e| ClientError::InvalidUri {
            reason: e.to_string(),
            url,
        })
    }

    /// `path` is the readable form used for `$count` detection; `uri` is what goes out.
    async fn send(&self, path: &str, uri: Uri) -> Result<TransportResponse, ClientError> {
        let mut request = Request::get(uri.clone())
            .body(Full::new(Bytes::new()))
            .map_err(|e| ClientError::InvalidUri {
                url: uri.to_string(),
                reason: e.to_string(),
            })?;
        request.headers_mut().extend(self.headers.clone());

        tracing::debug!(%uri, "sending OData request");
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        tracing::debug!(%uri, status = parts.status.as_u16(), "received OData response");

        if !parts.status.is_success() {
            let limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
            let parsed = match read_body_limited(body, limit).await {
                Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
                Err(ClientError::BodyTooLarge { .. }) => None,
                Err(e) => return Err(e),
            };
            return Err(ClientError::from_status(parts.status, parsed.as_ref()));
        }

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        check_content_type(path, &content_type)?;

        let bytes = read_body_limited(body, self.max_body_size).await?;
        let data = if content_type.trim().starts_with("application/json") {
            unwrap_value(serde_json::from_slice(&bytes)?)
        } else {
            Value::String(String::from_utf8_lossy(&bytes).trim().to_owned())
        };

        Ok(TransportResponse {
            data,
            headers: parts.headers,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<TransportResponse, ClientError> {
        let uri = self.request_uri(path)?;
        tokio::time::timeout(self.timeout, self.send(path, uri))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    async fn get_path(&self, path: &UrlPath) -> Result<TransportResponse, ClientError> {
        let uri = self.absolute_uri(&path.to_wire_string())?;
        let readable = path.to_string();
        tokio::time::timeout(self.timeout, self.send(&readable, uri))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Config(format!("invalid value for header {name}: {e}")))?;
        headers.insert(name, value);
    }
    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|e| ClientError::Config(format!("invalid user agent: {e}")))?;
    headers.insert(USER_AGENT, user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPES));
    Ok(headers)
}

fn build_https_connector(allow_http: bool) -> Result<HttpsConnector<HttpConnector>, ClientError> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| ClientError::Transport(Box::new(e)))?;
    let connector = if allow_http {
        builder.https_or_http().enable_all_versions().build()
    } else {
        builder.https_only().enable_all_versions().build()
    };
    Ok(connector)
}

async fn read_body_limited(body: Incoming, limit: usize) -> Result<Bytes, ClientError> {
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(ClientError::BodyTooLarge { limit });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

/// Percent-encode characters that may not appear verbatim in a request target.
///
/// Used for raw paths passed to [`Transport::get`]. The string is taken as already
/// delimited, so `&`, `=` and `%XX` escapes are kept; builders go through
/// [`Transport::get_path`], which escapes each parameter value on its own.
#[must_use]
pub fn encode_for_wire(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(
                byte,
                b'-' | b'.'
                    | b'_'
                    | b'~'
                    | b'!'
                    | b'$'
                    | b'&'
                    | b'\''
                    | b'('
                    | b')'
                    | b'*'
                    | b','
                    | b';'
                    | b'='
                    | b':'
                    | b'@'
                    | b'/'
                    | b'?'
                    | b'%'
            );
        if keep {
            encoded.push(char::from(byte));
        } else {
            encoded.push('%');
            encoded.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            encoded.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
        }
    }
    encoded
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_wire_encoding_keeps_delimiters() {
        assert_eq!(
            encode_for_wire("/Students?$filter=Code eq 'LAM'&$top=2"),
            "/Students?$filter=Code%20eq%20'LAM'&$top=2"
        );
        assert_eq!(encode_for_wire("/Courses('A%201')"), "/Courses('A%201')");
        assert_eq!(encode_for_wire("/X?$filter=a+b"), "/X?$filter=a%2Bb");
    }

    #[test]
    fn test_wire_uri_escapes_delimiters_inside_values() {
        let config = ClientConfig::new("https://service.odata.com/");
        let transport = HttpTransport::new(&config).unwrap();
        let mut path = UrlPath::root("Products");
        path.set_param("$filter", "Name eq 'Fish & Chips' and Discount eq '50%'");

        let uri = transport.absolute_uri(&path.to_wire_string()).unwrap();
        assert_eq!(
            uri.query(),
            Some("$filter=Name%20eq%20'Fish%20%26%20Chips'%20and%20Discount%20eq%20'50%25'")
        );
    }

    #[test]
    fn test_plain_http_requires_opt_in() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::Config(msg)) if msg.contains("'http'")
        ));
    }

    #[test]
    fn test_missing_scheme_is_rejected() {
        let config = ClientConfig::new("localhost/odata");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_request_uri_joins_base_and_path() {
        let config = ClientConfig::new("https://service.odata.com/root/");
        let transport = HttpTransport::new(&config).unwrap();
        let uri = transport.request_uri("/Students/$count").unwrap();
        assert_eq!(uri.to_string(), "https://service.odata.com/root/Students/$count");
    }

    #[test]
    fn test_invalid_header_is_a_config_error() {
        let config = ClientConfig::new("https://x.test/").with_header("bad header", "v");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::Config(_))
        ));
    }
}

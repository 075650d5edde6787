//! Client configuration.
//!
//! ```yaml
//! odata:
//!   base_url: "https://services.example.com/odata/"
//!   timeout: "30s"
//!   headers:
//!     Authorization: "Bearer ..."
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Page size used by pagination when the query has no `$top`.
pub const DEFAULT_PAGE_SIZE: u64 = 500;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default response body cap, 10 megabytes.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("odata-client/", env!("CARGO_PKG_VERSION"));

/// Key under which [`ClientConfig::from_figment`] looks for the client section.
pub const CONFIG_KEY: &str = "odata";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Service root; every request path is resolved against it.
    pub base_url: String,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub user_agent: String,

    pub max_body_size: usize,

    /// Permit plain `http://` service roots. Intended for local mock servers.
    pub allow_insecure_http: bool,

    /// Static headers sent with every request, e.g. credentials.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Extract the `odata` section of `figment`.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when the section is malformed or fails validation.
    pub fn from_figment(figment: &Figment) -> Result<Self, ClientError> {
        let config: Self = figment.extract_inner(CONFIG_KEY)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `ODATA_*` environment variables.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when the environment holds invalid values.
    pub fn from_env() -> Result<Self, ClientError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()).key(CONFIG_KEY))
            .merge(Env::prefixed("ODATA_").map(|key| format!("{CONFIG_KEY}.{key}").into()));
        Self::from_figment(&figment)
    }

    /// # Errors
    /// Returns [`ClientError::Config`] when `base_url` is empty or the limits are zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config(
                "the base_url option is required as it is used as the service root".to_owned(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be greater than zero".to_owned()));
        }
        if self.max_body_size == 0 {
            return Err(ClientError::Config(
                "max_body_size must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Allow plain HTTP service roots (mock servers, local development).
    #[must_use]
    pub fn allow_insecure_http(mut self) -> Self {
        tracing::warn!(
            target: "odata_client::security",
            "allow_insecure_http() called - HTTP traffic will NOT be encrypted"
        );
        self.allow_insecure_http = true;
        self
    }
}

/// `Duration` as a humantime string (`"30s"`, `"1m 30s"`).
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}

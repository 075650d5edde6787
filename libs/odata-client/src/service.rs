//! Service-root bootstrap and per-resource accessors.

use std::collections::BTreeMap;
use std::sync::Arc;

use heck::ToLowerCamelCase;
use odata_query::EntityKey;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::query::ResourceQuery;
use crate::transport::{Transport, unwrap_value};

/// Entry of the service document returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntitySet {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Entry point to an `OData` service: maps resource names to query builders.
///
/// Resource names are the lower-camel-cased entity-set names of the service document,
/// so `ClassSections` is reached as `classSections`.
#[derive(Clone)]
pub struct Service {
    transport: Arc<dyn Transport>,
    resources: BTreeMap<String, String>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Read the service document through `transport` and index its entity sets.
    ///
    /// # Errors
    /// Transport errors, or [`ClientError::Json`] when the document is not a list of
    /// entity sets.
    pub async fn connect(transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let response = transport.get("/").await?;
        let sets: Vec<EntitySet> = serde_json::from_value(unwrap_value(response.data))?;
        tracing::debug!(entity_sets = sets.len(), "loaded OData service document");
        Ok(Self::from_entity_sets(transport, sets))
    }

    /// Build an [`HttpTransport`] from `config` and connect through it.
    ///
    /// # Errors
    /// Configuration errors, plus everything [`connect`](Self::connect) returns.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Self::connect(Arc::new(transport)).await
    }

    /// Index already-known entity sets without contacting the service.
    #[must_use]
    pub fn from_entity_sets<I>(transport: Arc<dyn Transport>, sets: I) -> Self
    where
        I: IntoIterator<Item = EntitySet>,
    {
        let resources = sets
            .into_iter()
            .map(|set| (set.name.to_lower_camel_case(), set.url))
            .collect();
        Self {
            transport,
            resources,
        }
    }

    /// Fresh builder for the collection named `name`.
    ///
    /// # Errors
    /// [`ClientError::UnknownResource`] when the service does not expose `name`.
    pub fn resource(&self, name: &str) -> Result<ResourceQuery, ClientError> {
        let url = self.url(name)?;
        Ok(ResourceQuery::new(Arc::clone(&self.transport), url))
    }

    /// Fresh builder addressing one entity of `name` by primary key.
    ///
    /// # Errors
    /// [`ClientError::UnknownResource`] when the service does not expose `name`.
    pub fn entity(&self, name: &str, key: &EntityKey) -> Result<ResourceQuery, ClientError> {
        let url = self.url(name)?;
        Ok(ResourceQuery::entity(Arc::clone(&self.transport), url, key))
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    fn url(&self, name: &str) -> Result<&str, ClientError> {
        self.resources
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ClientError::UnknownResource(name.to_owned()))
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Async `OData` resource client.
//!
//! A [`Service`] reads the service document once and hands out [`ResourceQuery`]
//! builders per entity set. Builders render through `odata_query` and send requests
//! through a [`Transport`]; [`HttpTransport`] is the hyper-based implementation.
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//! use odata_client::{ClientConfig, Operator, Service};
//!
//! let config = ClientConfig::new("https://services.example.com/odata/")
//!     .with_header("Authorization", "Bearer token");
//! let service = Service::from_config(&config).await?;
//!
//! let mut students = service.resource("students")?;
//! students
//!     .filter(["Campus", "Code"], Operator::Eq, "LAM")
//!     .select(["FirstName", "LastName"]);
//! let total = students.count().await?;
//!
//! let mut pages = students.pages();
//! while let Some(page) = pages.next().await {
//!     let page = page?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod pager;
pub mod query;
pub mod service;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_PAGE_SIZE};
pub use error::ClientError;
pub use http::HttpTransport;
pub use pager::{Items, Pages};
pub use query::ResourceQuery;
pub use service::{EntitySet, Service};
pub use transport::{Transport, TransportResponse};

pub use odata_query::{
    EntityKey, Expression, Field, Operator, Order, Quantifier, SortDir, deferred, expression,
    field, func,
};

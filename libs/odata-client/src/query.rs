//! Per-resource query builder.
//!
//! [`ResourceQuery`] accumulates filter, ordering, projection and paging state, renders
//! it in canonical parameter order and talks to a [`Transport`].

use std::fmt;
use std::sync::Arc;

use odata_query::{
    EntityKey, Error as QueryError, Expression, IntoField, IntoOperand, Lambda, Node, Operator,
    Order, Quantifier, UrlPath,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::pager::{Items, Pages};
use crate::transport::Transport;

/// Query builder for one resource (entity set or single entity).
///
/// Fluent methods mutate the builder in place and return it for chaining; methods
/// that validate their input return `Result` and fail before any request is issued.
#[derive(Clone)]
pub struct ResourceQuery {
    transport: Arc<dyn Transport>,
    path: UrlPath,
    filter: Option<Expression>,
    order: Vec<Order>,
    select: Vec<String>,
    expand: Vec<String>,
    top: Option<u64>,
    skip: Option<u64>,
    search: Option<String>,
}

impl fmt::Debug for ResourceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceQuery")
            .field("query", &self.query())
            .finish_non_exhaustive()
    }
}

impl ResourceQuery {
    /// Builder addressing the collection at `resource`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, resource: impl Into<String>) -> Self {
        Self::with_path(transport, UrlPath::root(resource))
    }

    /// Builder addressing the single entity of `resource` identified by `key`.
    #[must_use]
    pub fn entity(transport: Arc<dyn Transport>, resource: &str, key: &EntityKey) -> Self {
        Self::with_path(transport, UrlPath::root(key.segment(resource)))
    }

    fn with_path(transport: Arc<dyn Transport>, path: UrlPath) -> Self {
        Self {
            transport,
            path,
            filter: None,
            order: Vec::new(),
            select: Vec::new(),
            expand: Vec::new(),
            top: None,
            skip: None,
            search: None,
        }
    }

    /// Replace the filter with `field <op> value`.
    pub fn filter(
        &mut self,
        field: impl IntoOperand,
        op: Operator,
        value: impl Into<Node>,
    ) -> &mut Self {
        self.filter = Some(Expression::new().append_op(field, op, value));
        self
    }

    /// Replace the filter with an arbitrary node: a field, function, chain or deferred builder.
    pub fn filter_expr(&mut self, node: impl IntoOperand) -> &mut Self {
        self.filter = Some(Expression::new().append(node));
        self
    }

    /// Replace the filter with a unary clause, `not <operand>`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidNegation`] for any operator other than `not`.
    pub fn filter_unary(
        &mut self,
        op: Operator,
        operand: impl IntoOperand,
    ) -> Result<&mut Self, QueryError> {
        self.filter = Some(Expression::new().append_unary(op, operand)?);
        Ok(self)
    }

    /// Extend the filter with `and field <op> value`, or start one.
    pub fn and(&mut self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> &mut Self {
        let chain = self.filter.take().unwrap_or_default();
        self.filter = Some(chain.and(field, op, value));
        self
    }

    /// Extend the filter with `or field <op> value`, or start one.
    pub fn or(&mut self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> &mut Self {
        let chain = self.filter.take().unwrap_or_default();
        self.filter = Some(chain.or(field, op, value));
        self
    }

    /// Extend the filter with `and <node>`, or start one.
    pub fn and_expr(&mut self, node: impl IntoOperand) -> &mut Self {
        let chain = self.filter.take().unwrap_or_default();
        self.filter = Some(chain.and_expr(node));
        self
    }

    /// Extend the filter with `or <node>`, or start one.
    pub fn or_expr(&mut self, node: impl IntoOperand) -> &mut Self {
        let chain = self.filter.take().unwrap_or_default();
        self.filter = Some(chain.or_expr(node));
        self
    }

    /// Replace the filter with `not <node>`.
    pub fn not(&mut self, node: impl IntoOperand) -> &mut Self {
        self.filter = Some(Expression::new().not(node));
        self
    }

    /// Replace the filter with `collection/any(x: x/field <op> value)`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidField`] when `collection` does not name a field.
    pub fn any(
        &mut self,
        collection: impl IntoField,
        field: impl IntoOperand,
        op: Operator,
        value: impl Into<Node>,
    ) -> Result<&mut Self, QueryError> {
        let lambda = Lambda::compare(Quantifier::Any, collection, field, op, value)?;
        Ok(self.filter_expr(lambda))
    }

    /// Replace the filter with `collection/all(x: x/field <op> value)`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidField`] when `collection` does not name a field.
    pub fn all(
        &mut self,
        collection: impl IntoField,
        field: impl IntoOperand,
        op: Operator,
        value: impl Into<Node>,
    ) -> Result<&mut Self, QueryError> {
        let lambda = Lambda::compare(Quantifier::All, collection, field, op, value)?;
        Ok(self.filter_expr(lambda))
    }

    /// Replace the filter with `collection/any(x: <predicate>)`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidField`] when `collection` does not name a field.
    pub fn any_where(
        &mut self,
        collection: impl IntoField,
        predicate: impl IntoOperand,
    ) -> Result<&mut Self, QueryError> {
        let lambda = Lambda::new(Quantifier::Any, collection, predicate)?;
        Ok(self.filter_expr(lambda))
    }

    /// Replace the filter with `collection/all(x: <predicate>)`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidField`] when `collection` does not name a field.
    pub fn all_where(
        &mut self,
        collection: impl IntoField,
        predicate: impl IntoOperand,
    ) -> Result<&mut Self, QueryError> {
        let lambda = Lambda::new(Quantifier::All, collection, predicate)?;
        Ok(self.filter_expr(lambda))
    }

    /// Append `$orderby` entries.
    pub fn order_by<I, O>(&mut self, orders: I) -> &mut Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Order>,
    {
        self.order.extend(orders.into_iter().map(Into::into));
        self
    }

    /// Append a textual `[field]` or `[field, direction]` entry.
    ///
    /// # Errors
    /// [`QueryError::InvalidOrder`] for more than two parts,
    /// [`QueryError::InvalidOrderDirection`] for an unknown direction.
    pub fn order_by_parts(&mut self, parts: &[&str]) -> Result<&mut Self, QueryError> {
        self.order.push(Order::from_parts(parts)?);
        Ok(self)
    }

    /// Append `$select` fields.
    pub fn select<I, F>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: IntoField,
    {
        self.select
            .extend(fields.into_iter().map(|f| f.into_field().to_string()));
        self
    }

    /// Append `$expand` fields, with their nested `$select`/`$expand` clauses.
    pub fn expand<I, F>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: IntoField,
    {
        self.expand
            .extend(fields.into_iter().map(|f| f.into_field().to_string()));
        self
    }

    /// Cap the number of returned items.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidTop`] unless `top > 0`.
    pub fn top(&mut self, top: i64) -> Result<&mut Self, QueryError> {
        match u64::try_from(top) {
            Ok(value) if value > 0 => {
                self.top = Some(value);
                Ok(self)
            }
            _ => Err(QueryError::InvalidTop(top)),
        }
    }

    /// Skip the first `skip` items. Zero is accepted and renders no `$skip`.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidSkip`] when `skip < 0`.
    pub fn skip(&mut self, skip: i64) -> Result<&mut Self, QueryError> {
        let value = u64::try_from(skip).map_err(|_| QueryError::InvalidSkip(skip))?;
        self.skip = Some(value);
        Ok(self)
    }

    /// Free-text `$search`.
    pub fn search(&mut self, term: impl Into<String>) -> &mut Self {
        self.search = Some(term.into());
        self
    }

    /// Arbitrary query parameter, rendered before the `$` options.
    pub fn custom(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.path.set_param(name, value);
        self
    }

    pub fn custom_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.path.set_params(params);
        self
    }

    #[must_use]
    pub fn top_value(&self) -> Option<u64> {
        self.top
    }

    #[must_use]
    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    pub(crate) fn set_page(&mut self, top: u64, skip: u64) {
        self.top = Some(top);
        self.skip = Some(skip);
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Accumulated path with every query option applied, in canonical order.
    #[must_use]
    pub fn build(&self) -> UrlPath {
        let mut path = self.path.clone();
        if let Some(top) = self.top {
            path.set_param("$top", top.to_string());
        }
        if let Some(skip) = self.skip.filter(|skip| *skip > 0) {
            path.set_param("$skip", skip.to_string());
        }
        if let Some(filter) = self.filter.as_ref().filter(|f| !f.is_empty()) {
            path.set_param("$filter", filter.to_string());
        }
        if !self.select.is_empty() {
            path.set_param("$select", self.select.join(","));
        }
        if !self.expand.is_empty() {
            path.set_param("$expand", self.expand.join(","));
        }
        if let Some(search) = &self.search {
            path.set_param("$search", search.clone());
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            path.set_param("$orderby", order);
        }
        path
    }

    /// Rendered request path, e.g. `/Students?$top=2&$filter=Age gt 18`.
    #[must_use]
    pub fn query(&self) -> String {
        self.build().to_string()
    }

    /// Accumulated `$count` path for the current state.
    #[must_use]
    pub fn count_path(&self) -> UrlPath {
        let mut path = self.build();
        path.push_segment("$count");
        path
    }

    /// Rendered `$count` request path for the current state.
    #[must_use]
    pub fn count_query(&self) -> String {
        self.count_path().to_string()
    }

    /// Number of items matching the current state.
    ///
    /// # Errors
    /// Transport errors, or [`ClientError::InvalidCount`] when the body is not an integer.
    pub async fn count(&self) -> Result<u64, ClientError> {
        let path = self.count_path();
        tracing::trace!(path = %path, "counting OData resource");
        let response = self.transport.get_path(&path).await?;
        parse_count(&response.data)
    }

    /// Fetch the payload for the current state.
    ///
    /// # Errors
    /// Transport, protocol or service errors.
    pub async fn fetch(&self) -> Result<Value, ClientError> {
        let path = self.build();
        tracing::trace!(path = %path, "fetching OData resource");
        let response = self.transport.get_path(&path).await?;
        Ok(response.data)
    }

    /// Fetch and deserialize the payload.
    ///
    /// # Errors
    /// As [`fetch`](Self::fetch), plus [`ClientError::Json`] when the payload does not
    /// match `T`.
    pub async fn fetch_as<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let data = self.fetch().await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Lazily paginated stream of page payloads.
    ///
    /// The stream counts once, then fetches pages of `$top` items (500 when unset),
    /// advancing `$skip` until the count is exhausted.
    pub fn pages(&mut self) -> Pages<'_> {
        Pages::new(self)
    }

    /// Lazily paginated stream of individual items, flattening each page array.
    pub fn items(&mut self) -> Items<'_> {
        Items::new(self.pages())
    }
}

pub(crate) fn parse_count(data: &Value) -> Result<u64, ClientError> {
    match data {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ClientError::InvalidCount(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ClientError::InvalidCount(s.clone())),
        other => Err(ClientError::InvalidCount(other.to_string())),
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Fluent `OData` filter expressions and query-string rendering.
//!
//! ```rust
//! use odata_query::{Expression, Operator, deferred, field};
//!
//! let filter = Expression::new()
//!     .and(field(["Campus", "Code"]), Operator::Eq, "LAM")
//!     .and_expr(deferred(|e| {
//!         e.or("Grade", Operator::Ge, 10).or("IsActive", Operator::Eq, true)
//!     }));
//! assert_eq!(
//!     filter.to_string(),
//!     "Campus/Code eq 'LAM' and (Grade ge 10 or IsActive eq true)"
//! );
//! ```

pub mod errors;
pub mod expression;
pub mod field;
pub mod literal;
pub mod naming;
pub mod node;
pub mod ops;
pub mod order;
pub mod path;
pub mod render;
pub mod typed;

pub use errors::Error;
pub use expression::Expression;
pub use field::{Field, IntoField};
pub use literal::{CastOptions, Literal};
pub use node::{Deferred, FunctionCall, IntoOperand, Lambda, Node, OperatorExpr};
pub use ops::{Operator, Quantifier, SortDir};
pub use order::Order;
pub use path::{EntityKey, UrlPath, encode_uri_component};
pub use typed::{TagPlacement, TypedValue};

/// Identifier or navigation path.
#[must_use]
pub fn field(value: impl IntoField) -> Field {
    value.into_field()
}

/// Function call with no arguments yet; add them with [`FunctionCall::arg`] or
/// [`FunctionCall::field`].
#[must_use]
pub fn func(name: impl Into<String>) -> FunctionCall {
    FunctionCall::new(name)
}

/// Standalone chain holding `field <op> value`, rendered parenthesized when nested.
#[must_use]
pub fn expression(field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> Expression {
    Expression::new().append_op(field, op, value)
}

/// Sub-expression built on demand from a fresh chain.
#[must_use]
pub fn deferred<F>(build: F) -> Deferred
where
    F: Fn(Expression) -> Expression + Send + Sync + 'static,
{
    Deferred::new(build)
}

/// Cast a value with plain literal rendering.
#[must_use]
pub fn cast(value: impl Into<Literal>) -> String {
    value.into().cast(CastOptions::LITERAL)
}

#[must_use]
pub fn guid(value: impl Into<Literal>) -> TypedValue {
    TypedValue::guid(value)
}

#[must_use]
pub fn decimal(value: impl Into<Literal>) -> TypedValue {
    TypedValue::decimal(value)
}

#[must_use]
pub fn single(value: impl Into<Literal>) -> TypedValue {
    TypedValue::single(value)
}

#[must_use]
pub fn double(value: impl Into<Literal>) -> TypedValue {
    TypedValue::double(value)
}

#[must_use]
pub fn int64(value: impl Into<Literal>) -> TypedValue {
    TypedValue::int64(value)
}

#[must_use]
pub fn datetime(value: impl Into<Literal>) -> TypedValue {
    TypedValue::datetime(value)
}

//! Filter expression tree.
//!
//! [`Node`] is the closed set of things a `$filter` can be made of. Conversions are
//! split in two: [`IntoOperand`] is used where a field is expected (strings become
//! identifiers), `Into<Node>` where a value is expected (strings become quoted literals).

use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::Error;
use crate::expression::Expression;
use crate::field::{Field, IntoField};
use crate::literal::Literal;
use crate::ops::{Operator, Quantifier};
use crate::typed::TypedValue;

#[derive(Clone, Debug)]
pub enum Node {
    Operator(Box<OperatorExpr>),
    Negated(Box<Node>),
    Function(FunctionCall),
    Lambda(Box<Lambda>),
    Chain(Box<Expression>),
    Deferred(Deferred),
    Field(Field),
    Literal(Literal),
}

impl Node {
    /// `left <op> right`
    #[must_use]
    pub fn operator(left: impl IntoOperand, op: Operator, right: impl Into<Node>) -> Self {
        Node::Operator(Box::new(OperatorExpr {
            left: left.into_operand(),
            op,
            right: right.into(),
        }))
    }

    /// `not <inner>`
    #[must_use]
    pub fn negated(inner: impl IntoOperand) -> Self {
        Node::Negated(Box::new(inner.into_operand()))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::serialize(self))
    }
}

/// Binary operator application.
#[derive(Clone, Debug)]
pub struct OperatorExpr {
    pub left: Node,
    pub op: Operator,
    pub right: Node,
}

/// Named function applied to an ordered argument list, e.g. `startswith(Code,'EXT')`.
#[derive(Clone, Debug)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Node>,
}

impl FunctionCall {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a value argument. Strings are quoted; pass a [`Field`] for identifiers.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Node>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a field argument. Strings become identifiers.
    #[must_use]
    pub fn field(mut self, field: impl IntoField) -> Self {
        self.args.push(Node::Field(field.into_field()));
        self
    }
}

/// `any`/`all` quantifier over a collection-valued field.
#[derive(Clone, Debug)]
pub struct Lambda {
    pub kind: Quantifier,
    pub collection: Field,
    pub predicate: Node,
}

impl Lambda {
    /// Quantifier over an arbitrary predicate node.
    ///
    /// # Errors
    /// Returns [`Error::InvalidField`] when the collection does not name a field.
    pub fn new(
        kind: Quantifier,
        collection: impl IntoField,
        predicate: impl IntoOperand,
    ) -> Result<Self, Error> {
        let collection = collection.into_field();
        collection.validate()?;
        Ok(Self {
            kind,
            collection,
            predicate: predicate.into_operand(),
        })
    }

    /// Quantifier over a single comparison `field <op> value`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidField`] when the collection does not name a field.
    pub fn compare(
        kind: Quantifier,
        collection: impl IntoField,
        field: impl IntoOperand,
        op: Operator,
        value: impl Into<Node>,
    ) -> Result<Self, Error> {
        Self::new(kind, collection, Node::operator(field, op, value))
    }
}

type BuildFn = dyn Fn(Expression) -> Expression + Send + Sync;

/// A sub-expression produced on demand from a fresh, empty [`Expression`].
///
/// Renders parenthesized, which is how grouped `or` clauses are written inside an
/// `and` chain.
#[derive(Clone)]
pub struct Deferred(Arc<BuildFn>);

impl Deferred {
    #[must_use]
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(Expression) -> Expression + Send + Sync + 'static,
    {
        Self(Arc::new(build))
    }

    #[must_use]
    pub fn build(&self) -> Expression {
        (self.0)(Expression::new())
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").finish_non_exhaustive()
    }
}

/// Conversion used for operand positions that default to field semantics.
pub trait IntoOperand {
    fn into_operand(self) -> Node;
}

impl<T: IntoField> IntoOperand for T {
    fn into_operand(self) -> Node {
        Node::Field(self.into_field())
    }
}

impl IntoOperand for Node {
    fn into_operand(self) -> Node {
        self
    }
}

impl IntoOperand for FunctionCall {
    fn into_operand(self) -> Node {
        Node::Function(self)
    }
}

impl IntoOperand for Lambda {
    fn into_operand(self) -> Node {
        Node::Lambda(Box::new(self))
    }
}

impl IntoOperand for Expression {
    fn into_operand(self) -> Node {
        Node::Chain(Box::new(self))
    }
}

impl IntoOperand for Deferred {
    fn into_operand(self) -> Node {
        Node::Deferred(self)
    }
}

impl From<Field> for Node {
    fn from(value: Field) -> Self {
        Node::Field(value)
    }
}

impl From<FunctionCall> for Node {
    fn from(value: FunctionCall) -> Self {
        Node::Function(value)
    }
}

impl From<Lambda> for Node {
    fn from(value: Lambda) -> Self {
        Node::Lambda(Box::new(value))
    }
}

impl From<Expression> for Node {
    fn from(value: Expression) -> Self {
        Node::Chain(Box::new(value))
    }
}

impl From<Deferred> for Node {
    fn from(value: Deferred) -> Self {
        Node::Deferred(value)
    }
}

impl From<OperatorExpr> for Node {
    fn from(value: OperatorExpr) -> Self {
        Node::Operator(Box::new(value))
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Node::Literal(value)
    }
}

macro_rules! node_from_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Literal(Literal::from(value))
                }
            }
        )*
    };
}

node_from_literal!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    &String,
    BigDecimal,
    DateTime<Utc>,
    NaiveDate,
    Bytes,
    TypedValue,
    uuid::Uuid,
);

impl<T: Into<Literal>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        Node::Literal(Literal::from(value))
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Node {
    fn from(values: Vec<T>) -> Self {
        Node::Literal(Literal::from(values))
    }
}

impl<T: Into<Literal>, const N: usize> From<[T; N]> for Node {
    fn from(values: [T; N]) -> Self {
        Node::Literal(Literal::from(values))
    }
}

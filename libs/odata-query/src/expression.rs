//! Fluent filter expression chain.

use std::fmt;

use crate::errors::Error;
use crate::node::{IntoOperand, Node};
use crate::ops::Operator;
use crate::render::serialize;

/// An appendable chain of filter nodes.
///
/// The chain keeps every completed node plus the focused last one. `and`/`or` fold
/// the focus with the new clause, so a chain built only from connectives always
/// collapses to a single top-level node.
///
/// # Example
///
/// ```rust
/// use odata_query::{Expression, Operator};
///
/// let filter = Expression::new()
///     .and("Code", Operator::Eq, "LAM")
///     .and("Age", Operator::Gt, 18);
/// assert_eq!(filter.to_string(), "Code eq 'LAM' and Age gt 18");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Expression {
    settled: Vec<Node>,
    focus: Option<Node>,
}

impl Expression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.focus.is_none()
    }

    /// Nodes of the chain in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.settled.iter().chain(self.focus.iter())
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.settled.iter_mut().chain(self.focus.iter_mut())
    }

    /// Push a node verbatim.
    #[must_use]
    pub fn append(mut self, node: impl IntoOperand) -> Self {
        self.push(node.into_operand());
        self
    }

    /// Push `field <op> value`.
    #[must_use]
    pub fn append_op(mut self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> Self {
        self.push(Node::operator(field, op, value));
        self
    }

    /// Push a unary clause. Only `not` is a unary operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNegation`] for any operator other than [`Operator::Not`].
    pub fn append_unary(mut self, op: Operator, operand: impl IntoOperand) -> Result<Self, Error> {
        if op != Operator::Not {
            return Err(Error::InvalidNegation(op.to_string()));
        }
        self.push(Node::negated(operand));
        Ok(self)
    }

    /// `<chain> and field <op> value`
    #[must_use]
    pub fn and(self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> Self {
        self.connect(Operator::And, Node::operator(field, op, value))
    }

    /// `<chain> or field <op> value`
    #[must_use]
    pub fn or(self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> Self {
        self.connect(Operator::Or, Node::operator(field, op, value))
    }

    /// `<chain> and <node>`
    #[must_use]
    pub fn and_expr(self, node: impl IntoOperand) -> Self {
        self.connect(Operator::And, node.into_operand())
    }

    /// `<chain> or <node>`
    #[must_use]
    pub fn or_expr(self, node: impl IntoOperand) -> Self {
        self.connect(Operator::Or, node.into_operand())
    }

    /// Push `not <node>`.
    #[must_use]
    pub fn not(self, node: impl IntoOperand) -> Self {
        self.append(Node::negated(node))
    }

    /// Push `not field <op> value`.
    #[must_use]
    pub fn not_op(self, field: impl IntoOperand, op: Operator, value: impl Into<Node>) -> Self {
        self.append(Node::negated(Node::operator(field, op, value)))
    }

    fn push(&mut self, node: Node) {
        if let Some(prev) = self.focus.replace(node) {
            self.settled.push(prev);
        }
    }

    fn connect(mut self, connective: Operator, node: Node) -> Self {
        let folded = match self.focus.take() {
            Some(prev) => Node::operator(prev, connective, node),
            None => node,
        };
        self.focus = Some(folded);
        self
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.nodes().map(serialize).collect::<Vec<_>>();
        f.write_str(&rendered.join(" "))
    }
}

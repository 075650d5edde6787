//! Serialization of [`Node`] trees into `$filter` syntax.
//!
//! Rendering never fails: every node kind has exactly one textual form. No
//! parentheses are inserted for precedence; only nested chains are wrapped.

use crate::literal::CastOptions;
use crate::naming::lambda_variable;
use crate::node::{FunctionCall, Lambda, Node, OperatorExpr};
use crate::ops::Operator;

/// Render a node to its `OData` text.
#[must_use]
pub fn serialize(node: &Node) -> String {
    match node {
        Node::Operator(expr) => serialize_operator(expr),
        Node::Negated(inner) => format!("{} {}", Operator::Not, operand(inner, CastOptions::PATH)),
        Node::Function(call) => serialize_function(call),
        Node::Lambda(lambda) => serialize_lambda(lambda),
        Node::Chain(chain) => format!("({chain})"),
        Node::Deferred(deferred) => format!("({})", deferred.build()),
        Node::Field(field) => field.to_string(),
        Node::Literal(literal) => literal.cast(CastOptions::LITERAL),
    }
}

/// Render a node in operand position; literals use `fallback`.
fn operand(node: &Node, fallback: CastOptions) -> String {
    match node {
        Node::Literal(literal) => literal.cast(fallback),
        other => serialize(other),
    }
}

fn serialize_operator(expr: &OperatorExpr) -> String {
    let left = operand(&expr.left, CastOptions::IDENTIFIER_PATH);
    if expr.op == Operator::In {
        let list = match &expr.right {
            Node::Literal(literal) => literal
                .clone()
                .into_list()
                .iter()
                .map(|item| item.cast(CastOptions::LITERAL))
                .collect::<Vec<_>>()
                .join(","),
            other => serialize(other),
        };
        return format!("{left} in ({list})");
    }
    format!(
        "{left} {} {}",
        expr.op,
        operand(&expr.right, CastOptions::LITERAL)
    )
}

fn serialize_function(call: &FunctionCall) -> String {
    let args = call
        .args
        .iter()
        .map(|arg| operand(arg, CastOptions::LITERAL))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({args})", call.name)
}

fn serialize_lambda(lambda: &Lambda) -> String {
    let variable = lambda_variable(lambda.collection.terminal());
    let mut predicate = lambda.predicate.clone();
    bind_variable(&mut predicate, &variable);
    format!(
        "{}/{}({variable}: {})",
        lambda.collection,
        lambda.kind,
        serialize(&predicate)
    )
}

/// Qualify the fields of a lambda predicate with the range variable.
///
/// `and`/`or` bind both sides; any other operator binds its left operand. Function
/// calls bind their field arguments. Grouped chains and deferred builders are bound
/// inside; nested lambdas keep their own scope.
fn bind_variable(node: &mut Node, variable: &str) {
    match node {
        Node::Field(field) => field.prepend(variable),
        Node::Function(call) => bind_function_args(call, variable),
        Node::Operator(expr) if matches!(expr.op, Operator::And | Operator::Or) => {
            bind_variable(&mut expr.left, variable);
            bind_variable(&mut expr.right, variable);
        }
        Node::Operator(expr) => bind_operand(&mut expr.left, variable),
        Node::Negated(inner) => bind_variable(inner, variable),
        Node::Chain(chain) => {
            for inner in chain.nodes_mut() {
                bind_variable(inner, variable);
            }
        }
        Node::Deferred(deferred) => {
            let mut chain = Box::new(deferred.build());
            for inner in chain.nodes_mut() {
                bind_variable(inner, variable);
            }
            *node = Node::Chain(chain);
        }
        Node::Lambda(_) | Node::Literal(_) => {}
    }
}

/// Left operand of a comparison or arithmetic operator.
fn bind_operand(node: &mut Node, variable: &str) {
    match node {
        Node::Operator(expr) if !matches!(expr.op, Operator::And | Operator::Or) => {
            bind_operand(&mut expr.left, variable);
        }
        other => bind_variable(other, variable),
    }
}

fn bind_function_args(call: &mut FunctionCall, variable: &str) {
    for arg in &mut call.args {
        if let Node::Field(field) = arg {
            field.prepend(variable);
        }
    }
}

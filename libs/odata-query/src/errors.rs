//! Usage errors raised while configuring expressions and queries.
//!
//! Every variant carries the offending value so a misconfigured builder call can be
//! traced back from the message alone.

/// Unified error type for builder misuse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("a $top clause must use a number strictly greater than 0, got {0}")]
    InvalidTop(i64),

    #[error("a $skip clause must use a number greater than or equal to 0, got {0}")]
    InvalidSkip(i64),

    #[error("invalid order clause [{0}]")]
    InvalidOrder(String),

    #[error("invalid sort direction `{0}`")]
    InvalidOrderDirection(String),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("`not` expressions must begin with the `not` operator, got `{0}`")]
    InvalidNegation(String),

    #[error("nested path on expanded identifier \"{0}\"")]
    NestedPathClause(String),

    #[error("invalid field `{0}`")]
    InvalidField(String),
}

use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Relational, arithmetic, membership and logical operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    In,
    Or,
    And,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Ge => "ge",
            Operator::Le => "le",
            Operator::Not => "not",
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Mod => "mod",
            Operator::In => "in",
            Operator::Or => "or",
            Operator::And => "and",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "gt" => Operator::Gt,
            "lt" => Operator::Lt,
            "ge" => Operator::Ge,
            "le" => Operator::Le,
            "not" => Operator::Not,
            "add" => Operator::Add,
            "sub" => Operator::Sub,
            "mul" => Operator::Mul,
            "div" => Operator::Div,
            "mod" => Operator::Mod,
            "in" => Operator::In,
            "or" => Operator::Or,
            "and" => Operator::And,
            _ => return Err(Error::UnknownOperator(s.to_owned())),
        })
    }
}

/// Sort direction of an `$orderby` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDir {
    Asc,
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        })
    }
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(Error::InvalidOrderDirection(s.to_owned())),
        }
    }
}

/// Collection quantifier of a lambda expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quantifier::Any => "any",
            Quantifier::All => "all",
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_is_case_insensitive() {
        assert_eq!("GT".parse::<Operator>().unwrap(), Operator::Gt);
        assert_eq!("in".parse::<Operator>().unwrap(), Operator::In);
        assert_eq!(Operator::Mod.to_string(), "mod");
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = "like".parse::<Operator>().unwrap_err();
        assert_eq!(err, Error::UnknownOperator("like".into()));
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDir>().unwrap(), SortDir::Desc);
        assert!(matches!(
            "sideways".parse::<SortDir>(),
            Err(Error::InvalidOrderDirection(d)) if d == "sideways"
        ));
    }
}

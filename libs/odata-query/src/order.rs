use std::fmt;

use crate::errors::Error;
use crate::expression::Expression;
use crate::field::Field;
use crate::node::{FunctionCall, IntoOperand, Node};
use crate::ops::SortDir;
use crate::render::serialize;

/// One `$orderby` entry: a field or function, optionally followed by a direction.
#[derive(Clone, Debug)]
pub struct Order {
    target: Node,
    dir: Option<SortDir>,
}

impl Order {
    /// Entry without an explicit direction.
    #[must_use]
    pub fn by(target: impl IntoOperand) -> Self {
        Self {
            target: target.into_operand(),
            dir: None,
        }
    }

    #[must_use]
    pub fn asc(target: impl IntoOperand) -> Self {
        Self::by(target).with_dir(SortDir::Asc)
    }

    #[must_use]
    pub fn desc(target: impl IntoOperand) -> Self {
        Self::by(target).with_dir(SortDir::Desc)
    }

    #[must_use]
    pub fn with_dir(mut self, dir: SortDir) -> Self {
        self.dir = Some(dir);
        self
    }

    /// Parse a textual `[field]` or `[field, direction]` entry.
    ///
    /// # Errors
    /// [`Error::InvalidOrder`] for an empty entry or one with more than two parts,
    /// [`Error::InvalidOrderDirection`] for an unknown direction.
    pub fn from_parts(parts: &[&str]) -> Result<Self, Error> {
        match parts {
            [field] => Ok(Self::by(*field)),
            [field, dir] => Ok(Self::by(*field).with_dir(dir.parse()?)),
            _ => Err(Error::InvalidOrder(parts.join(","))),
        }
    }

    #[must_use]
    pub fn dir(&self) -> Option<SortDir> {
        self.dir
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Node::Chain(chain) => write!(f, "{chain}")?,
            other => f.write_str(&serialize(other))?,
        }
        if let Some(dir) = self.dir {
            write!(f, " {dir}")?;
        }
        Ok(())
    }
}

impl From<&str> for Order {
    fn from(value: &str) -> Self {
        Self::by(value)
    }
}

impl From<String> for Order {
    fn from(value: String) -> Self {
        Self::by(value)
    }
}

impl From<Field> for Order {
    fn from(value: Field) -> Self {
        Self::by(value)
    }
}

impl From<FunctionCall> for Order {
    fn from(value: FunctionCall) -> Self {
        Self::by(value)
    }
}

impl From<Expression> for Order {
    fn from(value: Expression) -> Self {
        Self::by(value)
    }
}

impl<T: IntoOperand> From<(T, SortDir)> for Order {
    fn from((target, dir): (T, SortDir)) -> Self {
        Self::by(target).with_dir(dir)
    }
}

//! Literals annotated with an explicit `OData` primitive type.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::literal::{CastOptions, Literal};

/// Where the type tag goes relative to the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagPlacement {
    /// `<tag>'<value>'`, e.g. `guid'...'`
    Prefix,
    /// `<value><tag>`, e.g. `2.3f`
    Suffix,
}

/// A value carrying an `OData` primitive type annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    tag: &'static str,
    value: Box<Literal>,
    placement: TagPlacement,
}

impl TypedValue {
    #[must_use]
    pub fn new(tag: &'static str, value: impl Into<Literal>, placement: TagPlacement) -> Self {
        Self {
            tag,
            value: Box::new(value.into()),
            placement,
        }
    }

    /// `guid'<value>'`
    #[must_use]
    pub fn guid(value: impl Into<Literal>) -> Self {
        Self::new("guid", value, TagPlacement::Prefix)
    }

    /// `<value>M`
    #[must_use]
    pub fn decimal(value: impl Into<Literal>) -> Self {
        Self::new("M", value, TagPlacement::Suffix)
    }

    /// `<value>f`
    #[must_use]
    pub fn single(value: impl Into<Literal>) -> Self {
        Self::new("f", value, TagPlacement::Suffix)
    }

    /// `<value>d`
    #[must_use]
    pub fn double(value: impl Into<Literal>) -> Self {
        Self::new("d", value, TagPlacement::Suffix)
    }

    /// `<value>L`
    #[must_use]
    pub fn int64(value: impl Into<Literal>) -> Self {
        Self::new("L", value, TagPlacement::Suffix)
    }

    /// `datetime'<value>'`
    #[must_use]
    pub fn datetime(value: impl Into<Literal>) -> Self {
        Self::new("datetime", value, TagPlacement::Prefix)
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    #[must_use]
    pub fn value(&self) -> &Literal {
        &self.value
    }

    #[must_use]
    pub fn placement(&self) -> TagPlacement {
        self.placement
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.placement {
            TagPlacement::Suffix => {
                write!(f, "{}{}", self.value.cast(CastOptions::LITERAL), self.tag)
            }
            TagPlacement::Prefix => write!(
                f,
                "{}'{}'",
                self.tag,
                self.value.cast(CastOptions::IDENTIFIER_PATH)
            ),
        }
    }
}

impl From<Uuid> for TypedValue {
    fn from(value: Uuid) -> Self {
        Self::guid(value.hyphenated().to_string())
    }
}

impl From<BigDecimal> for TypedValue {
    fn from(value: BigDecimal) -> Self {
        Self::decimal(value)
    }
}

impl From<DateTime<Utc>> for TypedValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::datetime(value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_suffix_types() {
        assert_eq!(TypedValue::single(2.3).to_string(), "2.3f");
        assert_eq!(TypedValue::decimal(1.4).to_string(), "1.4M");
        assert_eq!(TypedValue::int64(9_999_999_999_i64).to_string(), "9999999999L");
        assert_eq!(TypedValue::double(1.234_56).to_string(), "1.23456d");
    }

    #[test]
    fn test_prefix_types_escape_without_extra_quotes() {
        assert_eq!(TypedValue::guid("x23-x24").to_string(), "guid'x23-x24'");
        assert_eq!(TypedValue::guid("a'b").to_string(), "guid'a''b'");
    }

    #[test]
    fn test_datetime_prefix() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            TypedValue::from(dt).to_string(),
            "datetime'2020-01-02T03:04:05.000Z'"
        );
    }

    #[test]
    fn test_from_uuid_and_bigdecimal() {
        let id = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            TypedValue::from(id).to_string(),
            "guid'67e55044-10b1-426f-9247-bb680e5fe0c8'"
        );
        let amount = BigDecimal::from_str("12.50").unwrap();
        assert_eq!(TypedValue::from(amount).to_string(), "12.50M");
    }
}

//! Host values rendered as `OData` literals.
//!
//! [`Literal`] is the closed set of primitive values a filter can carry. The only
//! rendering entry point is [`Literal::cast`], which is total over the enum.

use bigdecimal::BigDecimal;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::typed::TypedValue;

/// Rendering switches for [`Literal::cast`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastOptions {
    /// Render strings verbatim (escaped, unquoted) instead of as quoted literals.
    pub strings_as_identifiers: bool,
    /// Render arrays as a `/`-joined field path instead of a comma list.
    pub arrays_as_paths: bool,
}

impl CastOptions {
    /// Plain literal rendering: quoted strings, comma-joined arrays.
    pub const LITERAL: Self = Self {
        strings_as_identifiers: false,
        arrays_as_paths: false,
    };

    /// Quoted strings, arrays as field paths.
    pub const PATH: Self = Self {
        strings_as_identifiers: false,
        arrays_as_paths: true,
    };

    /// Identifier rendering: bare strings, arrays as field paths.
    pub const IDENTIFIER_PATH: Self = Self {
        strings_as_identifiers: true,
        arrays_as_paths: true,
    };
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Binary(Bytes),
    Array(Vec<Literal>),
    Typed(TypedValue),
}

impl Literal {
    /// Render the value as `OData` literal syntax.
    ///
    /// # Example
    ///
    /// ```rust
    /// use odata_query::{CastOptions, Literal};
    ///
    /// let lit = Literal::from("O'Neil");
    /// assert_eq!(lit.cast(CastOptions::LITERAL), "'O''Neil'");
    /// assert_eq!(lit.cast(CastOptions::IDENTIFIER_PATH), "O''Neil");
    /// ```
    #[must_use]
    pub fn cast(&self, opts: CastOptions) -> String {
        match self {
            Literal::Null => "null".to_owned(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(n) => n.to_string(),
            Literal::UInt(n) => n.to_string(),
            Literal::Float(x) => format_float(*x),
            Literal::Decimal(d) => d.to_string(),
            Literal::String(s) => {
                let escaped = escape(s);
                if opts.strings_as_identifiers {
                    escaped
                } else {
                    format!("'{escaped}'")
                }
            }
            Literal::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Literal::Date(d) => d.format("%Y-%m-%d").to_string(),
            Literal::Binary(bytes) => format!("binary'{}'", hex::encode(bytes)),
            Literal::Array(items) if opts.arrays_as_paths => items
                .iter()
                .map(|item| item.cast(CastOptions::IDENTIFIER_PATH))
                .collect::<Vec<_>>()
                .join("/"),
            Literal::Array(items) => items
                .iter()
                .map(|item| item.cast(CastOptions::LITERAL))
                .collect::<Vec<_>>()
                .join(","),
            Literal::Typed(typed) => typed.to_string(),
        }
    }

    /// Wrap a scalar into a one-element array; arrays are returned unchanged.
    #[must_use]
    pub fn into_list(self) -> Vec<Literal> {
        match self {
            Literal::Array(items) => items,
            scalar => vec![scalar],
        }
    }
}

/// Double every single quote.
#[must_use]
pub fn escape(raw: &str) -> String {
    raw.replace('\'', "''")
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_owned()
    } else if x.is_infinite() {
        if x.is_sign_negative() {
            "-INF".to_owned()
        } else {
            "INF".to_owned()
        }
    } else {
        x.to_string()
    }
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Literal {
                fn from(value: $ty) -> Self {
                    Literal::$variant(<$conv>::from(value))
                }
            }
        )*
    };
}

literal_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => String as String,
    &str => String as String,
    BigDecimal => Decimal as BigDecimal,
    DateTime<Utc> => DateTime as DateTime<Utc>,
    NaiveDate => Date as NaiveDate,
    Bytes => Binary as Bytes,
    TypedValue => Typed as TypedValue,
}

impl From<&String> for Literal {
    fn from(value: &String) -> Self {
        Literal::String(value.clone())
    }
}

impl From<uuid::Uuid> for Literal {
    fn from(value: uuid::Uuid) -> Self {
        Literal::Typed(TypedValue::from(value))
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(values: Vec<T>) -> Self {
        Literal::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Literal>, const N: usize> From<[T; N]> for Literal {
    fn from(values: [T; N]) -> Self {
        Literal::Array(values.into_iter().map(Into::into).collect())
    }
}

//! Identifiers and navigation paths.
//!
//! A [`Field`] with one segment is an identifier and may carry nested `$select` and
//! `$expand` clauses. A multi-segment field is a navigation path such as `Campus/Code`.

use std::fmt;

use crate::errors::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    segments: Vec<String>,
    selected: Option<Vec<Field>>,
    expanded: Option<Vec<Field>>,
}

impl Field {
    /// Identifier field.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
            selected: None,
            expanded: None,
        }
    }

    /// Navigation path built from its segments, e.g. `["Campus", "Code"]`.
    #[must_use]
    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            selected: None,
            expanded: None,
        }
    }

    /// Attach a nested `$select` clause.
    ///
    /// # Errors
    /// Returns [`Error::NestedPathClause`] when the field is a multi-segment path.
    pub fn select<I, F>(mut self, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = F>,
        F: IntoField,
    {
        self.ensure_identifier()?;
        self.selected = Some(fields.into_iter().map(IntoField::into_field).collect());
        Ok(self)
    }

    /// Attach a nested `$expand` clause.
    ///
    /// # Errors
    /// Returns [`Error::NestedPathClause`] when the field is a multi-segment path.
    pub fn expand<I, F>(mut self, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = F>,
        F: IntoField,
    {
        self.ensure_identifier()?;
        self.expanded = Some(fields.into_iter().map(IntoField::into_field).collect());
        Ok(self)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_path(&self) -> bool {
        self.segments.len() > 1
    }

    /// Last navigation step of the field.
    ///
    /// A single segment written with slashes (`"Campus/Code"`) yields its last part.
    #[must_use]
    pub fn terminal(&self) -> &str {
        self.segments
            .last()
            .map_or("", |last| last.rsplit('/').next().unwrap_or(last.as_str()))
    }

    /// Insert `segment` in front of the existing segments.
    pub fn prepend(&mut self, segment: impl Into<String>) {
        self.segments.insert(0, segment.into());
    }

    /// Check that the field names at least one non-empty segment.
    ///
    /// # Errors
    /// Returns [`Error::InvalidField`] for empty names.
    pub fn validate(&self) -> Result<(), Error> {
        if self.segments.is_empty() || self.segments.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidField(format!("{:?}", self.segments)));
        }
        Ok(())
    }

    fn ensure_identifier(&self) -> Result<(), Error> {
        if self.is_path() {
            return Err(Error::NestedPathClause(self.segments.join("/")));
        }
        Ok(())
    }
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))?;
        match (&self.selected, &self.expanded) {
            (Some(selected), Some(expanded)) => {
                write!(f, "($select={};$expand={})", join(selected), join(expanded))
            }
            (Some(selected), None) => write!(f, "($select={})", join(selected)),
            (None, Some(expanded)) => write!(f, "($expand={})", join(expanded)),
            (None, None) => Ok(()),
        }
    }
}

/// Conversion into a [`Field`]: strings become identifiers, sequences become paths.
pub trait IntoField {
    fn into_field(self) -> Field;
}

impl IntoField for Field {
    fn into_field(self) -> Field {
        self
    }
}

impl IntoField for &Field {
    fn into_field(self) -> Field {
        self.clone()
    }
}

impl IntoField for &str {
    fn into_field(self) -> Field {
        Field::new(self)
    }
}

impl IntoField for String {
    fn into_field(self) -> Field {
        Field::new(self)
    }
}

impl IntoField for &String {
    fn into_field(self) -> Field {
        Field::new(self.as_str())
    }
}

impl IntoField for Vec<&str> {
    fn into_field(self) -> Field {
        Field::path(self)
    }
}

impl IntoField for Vec<String> {
    fn into_field(self) -> Field {
        Field::path(self)
    }
}

impl IntoField for &[&str] {
    fn into_field(self) -> Field {
        Field::path(self.iter().copied())
    }
}

impl<const N: usize> IntoField for [&str; N] {
    fn into_field(self) -> Field {
        Field::path(self)
    }
}

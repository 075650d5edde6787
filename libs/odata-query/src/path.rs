//! Request path and query-parameter accumulator.

use std::fmt;

use crate::literal::{CastOptions, Literal};

/// Path segments plus named query parameters for a single request.
///
/// Parameters keep the position of their first insertion; setting an existing name
/// replaces its value in place. Cloning yields a fully independent accumulator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlPath {
    segments: Vec<String>,
    params: Vec<(String, String)>,
}

impl UrlPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator rooted at a single segment.
    #[must_use]
    pub fn root(segment: impl Into<String>) -> Self {
        let mut path = Self::new();
        path.push_segment(segment);
        path
    }

    pub fn push_segment(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push(segment.into());
        self
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn set_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.set_param(name, value);
        }
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Request target with every segment, parameter name and value escaped on its own.
    ///
    /// A value may carry `&`, `=`, `#` or `%` without splitting the query string.
    /// Existing `%XX` escapes in segments (entity keys) are kept.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        let segments = self
            .segments
            .iter()
            .map(|segment| encode_keeping(segment, SEGMENT_MARKS))
            .collect::<Vec<_>>()
            .join("/");
        if self.params.is_empty() {
            return format!("/{segments}");
        }
        let query = self
            .params
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    encode_keeping(name, QUERY_MARKS),
                    encode_keeping(value, QUERY_MARKS)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("/{segments}?{query}")
    }
}

/// Sub-delimiters left readable inside a path segment. `%` stays last so restored
/// escapes are not decoded a second time.
const SEGMENT_MARKS: &[char] = &[
    '!', '$', '&', '\'', '(', ')', '*', '+', ',', ';', '=', ':', '@', '%',
];

/// Characters left readable inside a query parameter name or value.
const QUERY_MARKS: &[char] = &['!', '$', '\'', '(', ')', '*', ',', ':', '@', '/'];

fn encode_keeping(raw: &str, marks: &[char]) -> String {
    let mut encoded = urlencoding::encode(raw).into_owned();
    for mark in marks {
        let escape = format!("%{:02X}", u32::from(*mark));
        if encoded.contains(&escape) {
            encoded = encoded.replace(&escape, mark.encode_utf8(&mut [0; 4]));
        }
    }
    encoded
}

/// Renders `/<segments>[?<params>]` with parameters in readable, unescaped form.
impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))?;
        if self.params.is_empty() {
            return Ok(());
        }
        let query = self
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        write!(f, "?{query}")
    }
}

/// Primary-key addressing of a single entity.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKey {
    /// `Resource(<key>)`
    Value(Literal),
    /// `Resource(<name>=<key>)`
    Named(String, Literal),
}

impl EntityKey {
    #[must_use]
    pub fn value(key: impl Into<Literal>) -> Self {
        EntityKey::Value(key.into())
    }

    #[must_use]
    pub fn named(name: impl Into<String>, key: impl Into<Literal>) -> Self {
        EntityKey::Named(name.into(), key.into())
    }

    /// Path segment addressing the entity inside `resource`.
    #[must_use]
    pub fn segment(&self, resource: &str) -> String {
        match self {
            EntityKey::Value(key) => {
                format!("{resource}({})", encode_uri_component(&key.cast(CastOptions::LITERAL)))
            }
            EntityKey::Named(name, key) => format!(
                "{resource}({name}={})",
                encode_uri_component(&key.cast(CastOptions::LITERAL))
            ),
        }
    }
}

/// Percent-encode a URI component, leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )` intact.
#[must_use]
pub fn encode_uri_component(raw: &str) -> String {
    urlencoding::encode(raw)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_bare_path() {
        assert_eq!(UrlPath::root("Students").to_string(), "/Students");
    }

    #[test]
    fn test_params_render_unescaped_in_insertion_order() {
        let mut path = UrlPath::root("Students");
        path.set_param("format", "json").set_param("key", "6aggf62gf6");
        assert_eq!(path.to_string(), "/Students?format=json&key=6aggf62gf6");

        path.set_param("$filter", "Code eq 'LAM'");
        assert_eq!(
            path.to_string(),
            "/Students?format=json&key=6aggf62gf6&$filter=Code eq 'LAM'"
        );
    }

    #[test]
    fn test_duplicate_param_overwrites_in_place() {
        let mut path = UrlPath::root("Students");
        path.set_params([("$top", "1"), ("$skip", "2"), ("$top", "3")]);
        assert_eq!(path.to_string(), "/Students?$top=3&$skip=2");
        assert_eq!(path.param("$top"), Some("3"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = UrlPath::root("Students");
        original.set_param("$top", "2");
        let mut copy = original.clone();
        copy.push_segment("$count").set_param("$top", "9");
        assert_eq!(original.to_string(), "/Students?$top=2");
        assert_eq!(copy.to_string(), "/Students/$count?$top=9");
    }

    #[test]
    fn test_entity_key_segments() {
        assert_eq!(EntityKey::value(134).segment("Students"), "Students(134)");
        assert_eq!(
            EntityKey::named("acmeId", 1234).segment("Students"),
            "Students(acmeId=1234)"
        );
        assert_eq!(
            EntityKey::value("A 1").segment("Courses"),
            "Courses('A%201')"
        );
    }

    #[test]
    fn test_wire_form_escapes_values_separately() {
        let mut path = UrlPath::root("Products");
        path.set_param("$filter", "Name eq 'Fish & Chips' and Discount eq '50%'")
            .set_param("$top", "2");
        assert_eq!(
            path.to_wire_string(),
            "/Products?$filter=Name%20eq%20'Fish%20%26%20Chips'%20and%20Discount%20eq%20'50%25'&$top=2"
        );
    }

    #[test]
    fn test_wire_form_keeps_key_escapes_and_separators() {
        let mut path = UrlPath::root(EntityKey::value("A 1").segment("Courses"));
        path.push_segment("$count")
            .set_param("$search", "a+b=c;d#e")
            .set_param("$select", "Id,Code");
        assert_eq!(
            path.to_wire_string(),
            "/Courses('A%201')/$count?$search=a%2Bb%3Dc%3Bd%23e&$select=Id,Code"
        );
        assert_eq!(UrlPath::root("Students").to_wire_string(), "/Students");
    }

    #[test]
    fn test_encode_uri_component_keeps_reserved_marks() {
        assert_eq!(encode_uri_component("a b/c'(d)*!"), "a%20b%2Fc'(d)*!");
    }
}

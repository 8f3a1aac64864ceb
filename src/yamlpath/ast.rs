//! Dotted key paths.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An ordered sequence of mapping keys identifying one node, written with
/// dots between segments (`spec.values.a.image.tag`).
///
/// Segments are compared against mapping keys by exact string equality.
/// There is no escaping, no wildcard and no sequence index: `items.0` looks
/// for a mapping key named `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    /// Keys that make up the path.
    segments: Vec<String>,
}

impl KeyPath {
    /// Creates a path from explicit segments, which may themselves contain
    /// dots.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Splits a dotted location into segments.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlset::yamlpath::KeyPath;
    ///
    /// let path = KeyPath::parse("spec.image.tag");
    /// assert_eq!(path.segments(), ["spec", "image", "tag"]);
    /// assert_eq!(path.to_string(), "spec.image.tag");
    /// ```
    pub fn parse(location: &str) -> Self {
        Self::new(location.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KeyPath {
    fn from(location: &str) -> Self {
        Self::parse(location)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        assert_eq!(KeyPath::parse("kind").segments(), ["kind"]);
    }

    #[test]
    fn test_parse_keeps_empty_segments() {
        let path = KeyPath::parse("a..b");
        assert_eq!(path.segments(), ["a", "", "b"]);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_explicit_segments_may_contain_dots() {
        let path = KeyPath::new(vec!["annotations".to_string(), "example.com/tag".to_string()]);
        assert_eq!(path.segments()[1], "example.com/tag");
        assert!(!path.is_empty());
    }

    #[test]
    fn test_from_str() {
        let path: KeyPath = "spec.values".parse().unwrap();
        assert_eq!(path, KeyPath::from("spec.values"));
    }
}

//! YAML node representation with source-position tracking.
//!
//! Each YAML value is wrapped in a `YamlNode` that remembers where its text
//! lives in the original source and whether it has been modified since
//! parsing. Unmodified nodes are never re-rendered: the serializer copies
//! their bytes verbatim, which is what keeps comments, quoting and layout
//! intact.
//!
//! # Example
//!
//! ```
//! use yamlset::document::node::{YamlNode, YamlValue, YamlString, YamlNumber};
//! use indexmap::IndexMap;
//!
//! let mut image = IndexMap::new();
//! image.insert(
//!     "repository".to_string(),
//!     YamlNode::new(YamlValue::String(YamlString::Plain("abc".to_string()))),
//! );
//! image.insert(
//!     "replicas".to_string(),
//!     YamlNode::new(YamlValue::Number(YamlNumber::Integer(3))),
//! );
//! let node = YamlNode::new(YamlValue::Object(image));
//!
//! assert!(node.is_modified()); // New nodes are marked as modified
//! assert!(node.value().is_object());
//! ```

use indexmap::IndexMap;

/// A byte range in the original YAML source.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct TextSpan {
    /// Start byte offset in original YAML
    pub start: usize,
    /// End byte offset in original YAML (exclusive)
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text covered by this span, if it lies within `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

/// Where a mapping value sits relative to its key.
///
/// `offset` points just past the `:` indicator (or past the key when the
/// entry has no indicator, as in the flow mapping `{a}`). Block collections
/// and empty values are replaced by writing at this offset.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct ValueSlot {
    pub offset: usize,
    pub has_indicator: bool,
}

/// How a node is laid out in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// A scalar, alias or flow collection: the span covers exactly the
    /// node's own text.
    #[default]
    Inline,
    /// A block mapping or sequence: the span runs from the first child to
    /// the end of the last one.
    Block,
}

/// Represents different YAML string styles
#[derive(Debug, Clone, PartialEq)]
pub enum YamlString {
    Plain(String),
    SingleQuoted(String),
    DoubleQuoted(String),
    Literal(String),
    Folded(String),
}

impl std::fmt::Display for YamlString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl YamlString {
    pub fn as_str(&self) -> &str {
        match self {
            YamlString::Plain(s)
            | YamlString::SingleQuoted(s)
            | YamlString::DoubleQuoted(s)
            | YamlString::Literal(s)
            | YamlString::Folded(s) => s,
        }
    }
}

/// Represents YAML numbers (integer or float)
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNumber {
    Integer(i64),
    Float(f64),
}

impl std::fmt::Display for YamlNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YamlNumber::Integer(i) => write!(f, "{}", i),
            YamlNumber::Float(fl) if fl.is_nan() => write!(f, ".nan"),
            YamlNumber::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { ".inf" } else { "-.inf" })
            }
            YamlNumber::Float(fl) => write!(f, "{:?}", fl),
        }
    }
}

/// A YAML value without metadata.
///
/// Objects and arrays contain `YamlNode` instances so that every level of the
/// tree keeps its source position.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    /// A YAML mapping, in document order
    Object(IndexMap<String, YamlNode>),
    /// A YAML sequence
    Array(Vec<YamlNode>),
    /// A YAML string with style information
    String(YamlString),
    /// A YAML number (integer or float)
    Number(YamlNumber),
    /// A YAML boolean
    Boolean(bool),
    /// A YAML null value, written or implicit
    Null,
    /// A YAML alias reference (`*name`), left unresolved
    Alias(String),
}

impl YamlValue {
    pub fn is_object(&self) -> bool {
        matches!(self, YamlValue::Object(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, YamlValue::Object(_) | YamlValue::Array(_))
    }

    /// Returns true for leaf values (everything that is not a collection).
    pub fn is_scalar(&self) -> bool {
        !self.is_container()
    }

    /// Returns the string content of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            YamlValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for YamlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YamlValue::String(s) => write!(f, "{}", s),
            YamlValue::Number(n) => write!(f, "{}", n),
            YamlValue::Boolean(b) => write!(f, "{}", b),
            YamlValue::Null => write!(f, "null"),
            YamlValue::Alias(name) => write!(f, "*{}", name),
            YamlValue::Object(entries) => write!(f, "{{{} entries}}", entries.len()),
            YamlValue::Array(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

/// Metadata associated with a YAML node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMetadata {
    /// Byte range in the original YAML string. `None` for nodes created in
    /// memory and for implicit empty values (`key:` with nothing after it).
    pub text_span: Option<TextSpan>,
    /// Insertion point after the owning key, for mapping values.
    pub value_slot: Option<ValueSlot>,
    /// Whether the span covers a block collection or inline text.
    pub layout: Layout,
    /// Whether the node sits inside a flow collection (`[...]` or `{...}`).
    pub in_flow: bool,
    /// Whether this node has been modified
    pub modified: bool,
}

/// A YAML value wrapped with metadata for tracking changes and formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    pub(crate) value: YamlValue,
    pub(crate) metadata: NodeMetadata,
}

impl YamlNode {
    /// Creates a new `YamlNode` with the given value.
    ///
    /// The node is marked as modified since it has no counterpart in any
    /// source text.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlset::document::node::{YamlNode, YamlValue, YamlNumber};
    ///
    /// let node = YamlNode::new(YamlValue::Number(YamlNumber::Integer(42)));
    /// assert!(node.is_modified());
    /// assert!(node.text_span().is_none());
    /// ```
    pub fn new(value: YamlValue) -> Self {
        Self {
            value,
            metadata: NodeMetadata {
                modified: true,
                ..NodeMetadata::default()
            },
        }
    }

    /// Creates an unmodified node read from source text.
    pub(crate) fn parsed(value: YamlValue, metadata: NodeMetadata) -> Self {
        Self {
            value,
            metadata: NodeMetadata {
                modified: false,
                ..metadata
            },
        }
    }

    /// Returns an immutable reference to the node's value.
    pub fn value(&self) -> &YamlValue {
        &self.value
    }

    /// Returns a mutable reference to the node's value.
    ///
    /// Calling this method marks the node as modified, even if the value is
    /// not actually changed.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlset::document::node::{YamlNode, YamlValue, YamlString};
    ///
    /// let mut node = YamlNode::new(YamlValue::String(YamlString::Plain("old".to_string())));
    /// *node.value_mut() = YamlValue::String(YamlString::Plain("new".to_string()));
    /// assert!(node.is_modified());
    /// ```
    pub fn value_mut(&mut self) -> &mut YamlValue {
        self.metadata.modified = true;
        &mut self.value
    }

    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    pub fn text_span(&self) -> Option<TextSpan> {
        self.metadata.text_span
    }

    /// Returns whether this node has been modified since parsing.
    pub fn is_modified(&self) -> bool {
        self.metadata.modified
    }

    /// Returns the child entry named `key` if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        match &self.value {
            YamlValue::Object(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Mutable variant of [`YamlNode::get`]. Does not mark this node as
    /// modified; only the child that is actually written to is.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut YamlNode> {
        match &mut self.value {
            YamlValue::Object(entries) => entries.get_mut(key),
            _ => None,
        }
    }

    /// End offset of this node in the source, falling back to its value slot
    /// for implicit empty values.
    pub(crate) fn source_end(&self) -> Option<usize> {
        self.metadata
            .text_span
            .map(|span| span.end)
            .or_else(|| self.metadata.value_slot.map(|slot| slot.offset))
    }
}

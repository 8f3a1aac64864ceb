//! YAML parsing with source-span tracking.
//!
//! The text is run through the `yaml-rust2` event parser. Every event comes
//! with a marker pointing at the start of its token; the [`TreeBuilder`]
//! closes each node's span with the helpers in [`super::scan`] and records
//! where mapping values sit relative to their keys. The result is a
//! [`YamlTree`] that still holds the original text, so the serializer can
//! reproduce every untouched byte.
//!
//! # Example
//!
//! ```
//! use yamlset::document::parser::parse_yaml;
//!
//! let tree = parse_yaml("# c\napiVersion: v1\nkind: Foo\n").unwrap();
//! let kind = tree.root().get("kind").unwrap();
//! assert_eq!(kind.value().as_str(), Some("Foo"));
//! assert_eq!(kind.text_span().unwrap().start, 25);
//! ```

use indexmap::IndexMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::Yaml;

use super::node::{Layout, NodeMetadata, TextSpan, YamlNode, YamlNumber, YamlString, YamlValue};
use super::scan;
use super::tree::YamlTree;
use crate::error::EditError;

/// Parses a single YAML document into a span-tracking tree.
///
/// Empty input yields a tree whose root is an implicit null. A stream with
/// more than one document is rejected.
///
/// # Errors
///
/// Returns [`EditError::Parse`] when the text is not valid YAML or holds
/// several documents.
pub fn parse_yaml(text: &str) -> Result<YamlTree, EditError> {
    let mut builder = TreeBuilder::new(text);
    let mut parser = Parser::new_from_str(text);
    parser
        .load(&mut builder, true)
        .map_err(|err| EditError::parse(err.to_string()))?;
    let root = builder.finish()?;
    Ok(YamlTree::with_source(root, Some(text.to_string())))
}

/// Maps the parser's character indices onto byte offsets.
struct CharOffsets {
    table: Option<Vec<usize>>,
    len: usize,
}

impl CharOffsets {
    fn new(source: &str) -> Self {
        let table = (!source.is_ascii()).then(|| {
            source
                .char_indices()
                .map(|(offset, _)| offset)
                .chain(std::iter::once(source.len()))
                .collect()
        });
        Self {
            table,
            len: source.len(),
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        match &self.table {
            Some(table) => table.get(char_index).copied().unwrap_or(self.len),
            None => char_index.min(self.len),
        }
    }
}

enum FrameKind {
    Mapping {
        entries: IndexMap<String, YamlNode>,
        pending_key: Option<PendingKey>,
    },
    Sequence {
        items: Vec<YamlNode>,
    },
}

struct PendingKey {
    /// Key text, for scalar keys only.
    name: Option<String>,
    end: usize,
}

/// A collection that is still receiving children.
struct Frame {
    kind: FrameKind,
    start: usize,
    /// Opened with `{` or `[`, as opposed to a block collection or a
    /// single-pair mapping inside a flow sequence.
    bracketed: bool,
    in_flow: bool,
    last_end: usize,
    /// Whether a child has been attached yet.
    has_children: bool,
}

struct TreeBuilder<'a> {
    source: &'a str,
    offsets: CharOffsets,
    stack: Vec<Frame>,
    documents: Vec<YamlNode>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offsets: CharOffsets::new(source),
            stack: Vec::new(),
            documents: Vec::new(),
        }
    }

    fn in_flow(&self) -> bool {
        self.stack.last().is_some_and(|frame| frame.in_flow)
    }

    fn finish(mut self) -> Result<YamlNode, EditError> {
        if self.documents.len() > 1 {
            return Err(EditError::parse(format!(
                "found {} documents, only single-document files are supported",
                self.documents.len()
            )));
        }
        Ok(self
            .documents
            .pop()
            .unwrap_or_else(|| YamlNode::parsed(YamlValue::Null, NodeMetadata::default())))
    }

    fn scalar(&mut self, value: String, style: TScalarStyle, mark: usize) {
        let source = self.source;
        let in_flow = self.in_flow();
        let key_text = value.clone();

        let (yaml_value, span) = match style {
            TScalarStyle::SingleQuoted => (
                YamlValue::String(YamlString::SingleQuoted(value)),
                Some(TextSpan::new(mark, scan::quoted_end(source, mark, b'\''))),
            ),
            TScalarStyle::DoubleQuoted => (
                YamlValue::String(YamlString::DoubleQuoted(value)),
                Some(TextSpan::new(mark, scan::quoted_end(source, mark, b'"'))),
            ),
            TScalarStyle::Literal => (
                YamlValue::String(YamlString::Literal(value)),
                Some(block_scalar_span(source, mark)),
            ),
            TScalarStyle::Folded => (
                YamlValue::String(YamlString::Folded(value)),
                Some(block_scalar_span(source, mark)),
            ),
            // A plain scalar is never empty in the text; the parser reports
            // a missing value (`key:` with nothing after it) this way.
            _ if value.is_empty() => (YamlValue::Null, None),
            _ => {
                let end = scan::plain_end(source, mark, &value, in_flow);
                (resolve_plain(value), Some(TextSpan::new(mark, end)))
            }
        };

        let metadata = NodeMetadata {
            text_span: span,
            in_flow,
            ..NodeMetadata::default()
        };
        let key = span.is_some().then_some(key_text);
        self.push(YamlNode::parsed(yaml_value, metadata), key);
    }

    fn alias(&mut self, start: usize) {
        let in_flow = self.in_flow();
        let end = scan::alias_end(self.source, start, in_flow);
        let name = self
            .source
            .get(start + 1..end)
            .unwrap_or_default()
            .to_string();
        let metadata = NodeMetadata {
            text_span: Some(TextSpan::new(start, end)),
            in_flow,
            ..NodeMetadata::default()
        };
        self.push(YamlNode::parsed(YamlValue::Alias(name), metadata), None);
    }

    fn open(&mut self, start: usize, mapping: bool) {
        let opener = if mapping { b'{' } else { b'[' };
        let bracketed = self.source.as_bytes().get(start) == Some(&opener);
        let kind = if mapping {
            FrameKind::Mapping {
                entries: IndexMap::new(),
                pending_key: None,
            }
        } else {
            FrameKind::Sequence { items: Vec::new() }
        };
        let in_flow = bracketed || self.in_flow();
        self.stack.push(Frame {
            kind,
            start,
            bracketed,
            in_flow,
            last_end: if bracketed { start + 1 } else { start },
            has_children: false,
        });
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let (value, closer) = match frame.kind {
            FrameKind::Mapping { entries, .. } => (YamlValue::Object(entries), b'}'),
            FrameKind::Sequence { items } => (YamlValue::Array(items), b']'),
        };
        let (end, layout) = if frame.bracketed {
            (
                scan::flow_collection_end(self.source, frame.last_end, closer),
                Layout::Inline,
            )
        } else if frame.in_flow {
            (frame.last_end, Layout::Inline)
        } else {
            (frame.last_end, Layout::Block)
        };
        let metadata = NodeMetadata {
            text_span: Some(TextSpan::new(frame.start, end.max(frame.start))),
            layout,
            in_flow: self.in_flow(),
            ..NodeMetadata::default()
        };
        self.push(YamlNode::parsed(value, metadata), None);
    }

    /// Attaches a finished node to the collection being built, or records it
    /// as a document root.
    fn push(&mut self, mut node: YamlNode, key_text: Option<String>) {
        let source = self.source;
        let node_end = node.source_end();
        let Some(frame) = self.stack.last_mut() else {
            self.documents.push(node);
            return;
        };

        // Block collections are marked at their first indicator rather than
        // their first child, so the start is taken from that child.
        if !frame.bracketed && !frame.has_children {
            if let Some(span) = node.text_span() {
                frame.start = match frame.kind {
                    FrameKind::Sequence { .. } => scan::sequence_entry_start(source, span.start),
                    FrameKind::Mapping { .. } => span.start,
                };
            }
        }
        frame.has_children = true;

        match &mut frame.kind {
            FrameKind::Sequence { items } => {
                if let Some(end) = node_end {
                    frame.last_end = frame.last_end.max(end);
                }
                items.push(node);
            }
            FrameKind::Mapping {
                entries,
                pending_key,
            } => match pending_key.take() {
                None => {
                    let end = node_end.unwrap_or(frame.last_end);
                    frame.last_end = frame.last_end.max(end);
                    *pending_key = Some(PendingKey {
                        name: key_text.filter(|_| node.value().is_scalar()),
                        end,
                    });
                }
                Some(key) => {
                    let slot = scan::value_slot(source, key.end);
                    node.metadata.value_slot = Some(slot);
                    let end = node.source_end().unwrap_or(slot.offset);
                    frame.last_end = frame.last_end.max(end);
                    if let Some(name) = key.name {
                        entries.entry(name).or_insert(node);
                    }
                }
            },
        }
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        let offset = self.offsets.byte_offset(mark.index());
        match ev {
            Event::Scalar(value, style, ..) => self.scalar(value, style, offset),
            Event::Alias { .. } => self.alias(offset),
            Event::MappingStart { .. } => self.open(offset, true),
            Event::SequenceStart { .. } => self.open(offset, false),
            Event::MappingEnd { .. } | Event::SequenceEnd { .. } => self.close(),
            _ => {}
        }
    }
}

/// Span of a literal or folded block scalar. The parser marks the first
/// content character; the span starts at the `|` or `>` header instead.
fn block_scalar_span(source: &str, mark: usize) -> TextSpan {
    let start = scan::block_scalar_header(source, mark);
    TextSpan::new(start, scan::block_scalar_end(source, start))
}

/// Applies the core schema to a plain scalar.
fn resolve_plain(value: String) -> YamlValue {
    match Yaml::from_str(&value) {
        Yaml::Integer(i) => YamlValue::Number(YamlNumber::Integer(i)),
        real @ Yaml::Real(_) => match real.as_f64() {
            Some(f) => YamlValue::Number(YamlNumber::Float(f)),
            None => YamlValue::String(YamlString::Plain(value)),
        },
        Yaml::Boolean(b) => YamlValue::Boolean(b),
        Yaml::Null => YamlValue::Null,
        _ => YamlValue::String(YamlString::Plain(value)),
    }
}

//! Rendering document trees back to YAML text.
//!
//! For a tree parsed from text, unmodified nodes are never re-rendered: the
//! original source is copied through and only modified nodes are spliced in
//! at their recorded positions. Everything outside those regions (comments,
//! blank lines, indentation, quoting) stays byte-identical. The spliced
//! output is parsed again before it is returned.
//!
//! Trees built in memory have no source and are emitted in plain block style.

use std::fmt::Write as _;

use indexmap::IndexMap;
use yaml_rust2::YamlLoader;

use super::node::{Layout, YamlNode, YamlString, YamlValue};
use super::scan::is_flow_indicator;
use super::tree::YamlTree;
use crate::error::EditError;

const INDENT: usize = 2;

/// Serializes a tree to YAML text.
///
/// # Errors
///
/// Returns [`EditError::Serialize`] when a modified node has no position to
/// be written at (for example a replaced document root), or when the
/// resulting text is not valid YAML.
pub fn serialize_tree(tree: &YamlTree) -> Result<String, EditError> {
    match tree.original_source() {
        Some(source) => serialize_preserving_format(tree.root(), source),
        None => Ok(emit_document(tree.root())),
    }
}

/// A replacement of `source[start..end]` with `text`.
#[derive(Debug, PartialEq)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

fn serialize_preserving_format(root: &YamlNode, source: &str) -> Result<String, EditError> {
    let mut splices = Vec::new();
    collect_splices(root, &mut splices)?;
    if splices.is_empty() {
        return Ok(source.to_string());
    }
    splices.sort_by_key(|splice| (splice.start, splice.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for splice in &splices {
        let unchanged = source
            .get(cursor..splice.start)
            .filter(|_| splice.end >= splice.start)
            .ok_or_else(|| {
                EditError::serialize(format!(
                    "edit at bytes {}..{} overlaps an earlier edit",
                    splice.start, splice.end
                ))
            })?;
        output.push_str(unchanged);
        output.push_str(&splice.text);
        cursor = splice.end;
    }
    output.push_str(source.get(cursor..).unwrap_or_default());

    YamlLoader::load_from_str(&output)
        .map_err(|err| EditError::serialize(format!("edited document is not valid yaml: {err}")))?;
    Ok(output)
}

fn collect_splices(node: &YamlNode, splices: &mut Vec<Splice>) -> Result<(), EditError> {
    if node.is_modified() {
        splices.push(splice_for(node)?);
        return Ok(());
    }
    match node.value() {
        YamlValue::Object(entries) => entries
            .values()
            .try_for_each(|child| collect_splices(child, splices)),
        YamlValue::Array(items) => items
            .iter()
            .try_for_each(|child| collect_splices(child, splices)),
        _ => Ok(()),
    }
}

fn splice_for(node: &YamlNode) -> Result<Splice, EditError> {
    let metadata = node.metadata();
    let text = render_inline(node.value(), metadata.in_flow);

    match (metadata.layout, metadata.text_span, metadata.value_slot) {
        (Layout::Inline, Some(span), _) => Ok(Splice {
            start: span.start,
            end: span.end,
            text,
        }),
        // Block collections and empty values are rewritten from the key's
        // indicator onwards so the new scalar lands on the key's line.
        (_, span, Some(slot)) => {
            let lead = if slot.has_indicator { " " } else { ": " };
            Ok(Splice {
                start: slot.offset,
                end: span.map_or(slot.offset, |span| span.end),
                text: format!("{lead}{text}"),
            })
        }
        _ => Err(EditError::serialize(
            "modified node has no position in the source document",
        )),
    }
}

/// Renders a value on a single line, as it would appear after `key: `.
pub fn render_inline(value: &YamlValue, in_flow: bool) -> String {
    match value {
        YamlValue::String(s) => render_string(s, in_flow),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Boolean(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Alias(name) => format!("*{}", name),
        YamlValue::Object(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(key, child)| {
                    format!("{}: {}", render_key(key, true), render_inline(child.value(), true))
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        YamlValue::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|child| render_inline(child.value(), true))
                .collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// Renders a string scalar in its own style where that style can be written
/// on one line. Plain text that would not read back as the same string is
/// double-quoted.
pub fn render_string(s: &YamlString, in_flow: bool) -> String {
    match s {
        YamlString::Plain(text) if !needs_quotes(text, in_flow) => text.clone(),
        YamlString::SingleQuoted(text) if !text.chars().any(char::is_control) => {
            format!("'{}'", text.replace('\'', "''"))
        }
        other => double_quote(other.as_str()),
    }
}

fn render_key(key: &str, in_flow: bool) -> String {
    render_string(&YamlString::Plain(key.to_string()), in_flow)
}

/// Whether `text` cannot be written as a plain scalar at this position.
///
/// Only grammar is considered: text such as `123` or `true` stays plain
/// even though it would read back as a number or a boolean.
pub fn needs_quotes(text: &str, in_flow: bool) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    let second = chars.next();

    if first.is_whitespace() || text.ends_with(char::is_whitespace) {
        return true;
    }
    if text.chars().any(|c| c.is_control() || c == '\u{feff}') {
        return true;
    }
    if matches!(
        first,
        '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' | '{' | '}' | '[' | ']' | ','
    ) {
        return true;
    }
    if matches!(first, '-' | '?' | ':') {
        match second {
            None => return true,
            Some(c) if c.is_whitespace() => return true,
            Some(c) if in_flow && c.is_ascii() && is_flow_indicator(c as u8) => return true,
            _ => {}
        }
    }
    if text.contains(": ") || text.ends_with(':') || text.contains(" #") {
        return true;
    }
    in_flow && text.bytes().any(is_flow_indicator)
}

fn double_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() || c == '\u{feff}' => {
                let code = c as u32;
                if code <= 0xff {
                    let _ = write!(out, "\\x{:02X}", code);
                } else {
                    let _ = write!(out, "\\u{:04X}", code);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn emit_document(root: &YamlNode) -> String {
    let mut out = String::new();
    match root.value() {
        YamlValue::Object(entries) if !entries.is_empty() => emit_mapping(entries, 0, &mut out),
        YamlValue::Array(items) if !items.is_empty() => emit_sequence(items, 0, &mut out),
        value => {
            out.push_str(&render_inline(value, false));
            out.push('\n');
        }
    }
    out
}

fn emit_mapping(entries: &IndexMap<String, YamlNode>, indent: usize, out: &mut String) {
    for (key, node) in entries {
        out.push_str(&" ".repeat(indent));
        out.push_str(&render_key(key, false));
        out.push(':');
        emit_value(node, indent, out);
    }
}

fn emit_sequence(items: &[YamlNode], indent: usize, out: &mut String) {
    for item in items {
        out.push_str(&" ".repeat(indent));
        out.push('-');
        emit_value(item, indent, out);
    }
}

fn emit_value(node: &YamlNode, indent: usize, out: &mut String) {
    match node.value() {
        YamlValue::Object(entries) if !entries.is_empty() => {
            out.push('\n');
            emit_mapping(entries, indent + INDENT, out);
        }
        YamlValue::Array(items) if !items.is_empty() => {
            out.push('\n');
            emit_sequence(items, indent + INDENT, out);
        }
        value => {
            out.push(' ');
            out.push_str(&render_inline(value, false));
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::YamlNumber;
    use crate::document::parser::parse_yaml;
    use crate::yamlpath::KeyPath;

    fn plain(text: &str) -> YamlValue {
        YamlValue::String(YamlString::Plain(text.to_string()))
    }

    #[test]
    fn test_unmodified_tree_is_copied_verbatim() {
        let source = "# c\na:   1   # spaced\n\n\nb: 'q'\r\n";
        let tree = parse_yaml(source).unwrap();
        assert_eq!(serialize_tree(&tree).unwrap(), source);
    }

    #[test]
    fn test_splice_replaces_only_target() {
        let source = "a: 1 # one\nb: 2 # two\n";
        let mut tree = parse_yaml(source).unwrap();
        *tree.resolve_mut(&KeyPath::parse("b")).unwrap().value_mut() = plain("x");
        assert_eq!(serialize_tree(&tree).unwrap(), "a: 1 # one\nb: x # two\n");
    }

    #[test]
    fn test_replacing_root_fails() {
        let mut tree = parse_yaml("a: 1\n").unwrap();
        *tree.root_mut().value_mut() = plain("x");
        let err = serialize_tree(&tree).unwrap_err();
        assert!(matches!(err, EditError::Serialize { .. }));
    }

    #[test]
    fn test_needs_quotes() {
        for text in ["v2", "1.2.3", "repo:tag", "-1", "a#b", "true", "123", "héllo"] {
            assert!(!needs_quotes(text, false), "{text:?} should stay plain");
        }
        for text in ["", " lead", "trail ", "a: b", "end:", "a #b", "#x", "- x", "*x", "line\nbreak", "tab\there", "'", "\"q\""] {
            assert!(needs_quotes(text, false), "{text:?} should be quoted");
        }
        assert!(!needs_quotes("a,b", false));
        assert!(needs_quotes("a,b", true));
        assert!(needs_quotes("x]", true));
    }

    #[test]
    fn test_render_string_styles() {
        assert_eq!(render_string(&YamlString::Plain("v2".to_string()), false), "v2");
        assert_eq!(render_string(&YamlString::Plain("a: b".to_string()), false), "\"a: b\"");
        assert_eq!(render_string(&YamlString::Plain(String::new()), false), "\"\"");
        assert_eq!(
            render_string(&YamlString::SingleQuoted("it's".to_string()), false),
            "'it''s'"
        );
        assert_eq!(
            render_string(&YamlString::Literal("a\n\"b\"\\\u{1}".to_string()), false),
            "\"a\\n\\\"b\\\"\\\\\\x01\""
        );
    }

    #[test]
    fn test_render_inline_collections() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), YamlNode::new(plain("x,y")));
        entries.insert(
            "b".to_string(),
            YamlNode::new(YamlValue::Array(vec![
                YamlNode::new(YamlValue::Number(YamlNumber::Integer(1))),
                YamlNode::new(YamlValue::Boolean(false)),
            ])),
        );
        assert_eq!(
            render_inline(&YamlValue::Object(entries), false),
            "{a: \"x,y\", b: [1, false]}"
        );
    }

    #[test]
    fn test_emit_tree_without_source() {
        let mut image = IndexMap::new();
        image.insert("repository".to_string(), YamlNode::new(plain("abc")));
        image.insert("tag".to_string(), YamlNode::new(plain("v1")));
        let mut root = IndexMap::new();
        root.insert("image".to_string(), YamlNode::new(YamlValue::Object(image)));
        root.insert(
            "ports".to_string(),
            YamlNode::new(YamlValue::Array(vec![
                YamlNode::new(YamlValue::Number(YamlNumber::Integer(80))),
                YamlNode::new(YamlValue::Null),
            ])),
        );
        let tree = YamlTree::new(YamlNode::new(YamlValue::Object(root)));

        assert_eq!(
            serialize_tree(&tree).unwrap(),
            "image:\n  repository: abc\n  tag: v1\nports:\n  - 80\n  - null\n"
        );
    }
}

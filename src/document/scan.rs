//! Byte-level helpers that measure how far a YAML token extends in the source.
//!
//! The event parser reports where each node starts but not where it ends, so
//! the tree builder uses these helpers to close every span. All offsets are
//! byte offsets into the original text; breaks only ever happen on ASCII
//! bytes, which keeps every returned offset on a char boundary.

use super::node::ValueSlot;

pub(crate) fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

pub(crate) fn is_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

pub(crate) fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|pos| from + pos)
}

/// End of a single- or double-quoted scalar starting at `start`.
pub(crate) fn quoted_end(source: &str, start: usize, quote: u8) -> usize {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End of the plain-scalar text on the line starting at `pos`, with
/// trailing blanks excluded.
fn plain_line_end(bytes: &[u8], pos: usize, in_flow: bool) -> usize {
    let mut last = pos;
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if is_break(b) {
            break;
        }
        if b == b'#' && i > pos && is_blank(bytes[i - 1]) {
            break;
        }
        if b == b':' {
            let next = bytes.get(i + 1).copied();
            let ends = match next {
                None => true,
                Some(n) => is_blank(n) || is_break(n) || (in_flow && is_flow_indicator(n)),
            };
            if ends {
                break;
            }
        }
        if in_flow && is_flow_indicator(b) {
            break;
        }
        if !is_blank(b) {
            last = i + 1;
        }
        i += 1;
    }
    last
}

/// End of a plain scalar starting at `start` whose parsed value is `value`.
///
/// Plain scalars may continue over several lines; continuation lines are
/// folded into the value with single spaces (or newlines for blank lines).
/// Lines are consumed while the folded text still matches `value`.
pub(crate) fn plain_end(source: &str, start: usize, value: &str, in_flow: bool) -> usize {
    let bytes = source.as_bytes();
    let first = plain_line_end(bytes, start, in_flow);
    let mut folded = source.get(start..first).unwrap_or_default().to_string();
    if folded == value || !value.starts_with(folded.as_str()) {
        return first;
    }

    let mut cursor = first;
    let mut breaks = 0usize;
    while let Some(newline) = find_byte(bytes, cursor, b'\n') {
        let mut i = newline + 1;
        while i < bytes.len() && is_blank(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        if is_break(bytes[i]) {
            breaks += 1;
            cursor = i;
            continue;
        }
        if bytes[i] == b'#' {
            break;
        }
        let line_end = plain_line_end(bytes, i, in_flow);
        if line_end == i {
            break;
        }

        if breaks == 0 {
            folded.push(' ');
        }
        for _ in 0..breaks {
            folded.push('\n');
        }
        breaks = 0;
        folded.push_str(source.get(i..line_end).unwrap_or_default());

        if !value.starts_with(folded.as_str()) {
            break;
        }
        if folded.len() >= value.len() {
            return line_end;
        }
        cursor = line_end;
    }
    first
}

/// Column of the node that owns a block scalar header at `start`, i.e. the
/// indentation its content must exceed. `None` when the header opens its
/// line and no sequence dash precedes it.
fn block_owner_indent(bytes: &[u8], start: usize) -> Option<usize> {
    let line_start = bytes[..start]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    let mut i = line_start;
    while i < start && bytes[i] == b' ' {
        i += 1;
    }
    let mut dash = None;
    while i < start && bytes[i] == b'-' && bytes.get(i + 1).is_some_and(|&b| is_blank(b)) {
        dash = Some(i - line_start);
        i += 1;
        while i < start && is_blank(bytes[i]) {
            i += 1;
        }
    }
    if i >= start {
        dash
    } else {
        Some(i - line_start)
    }
}

/// Offset of the `|` or `>` header of a block scalar whose content starts
/// at `mark`. Blank lines and comment lines between the header and the
/// content are skipped. Falls back to `mark` if no header is found.
pub(crate) fn block_scalar_header(source: &str, mark: usize) -> usize {
    let bytes = source.as_bytes();
    let mut line_end = mark.min(bytes.len());
    loop {
        let line_start = bytes[..line_end]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let line = &bytes[line_start..line_end];
        let text_start = line.iter().position(|&b| !is_blank(b) && b != b'\r');
        match text_start {
            None => {}
            Some(offset) if line[offset] == b'#' => {}
            Some(_) => return header_in_line(bytes, line_start, line_end).unwrap_or(mark),
        }
        if line_start == 0 {
            return mark;
        }
        line_end = line_start - 1;
    }
}

/// Last block scalar header on the line `[line_start, line_end)`, ignoring
/// any trailing comment.
fn header_in_line(bytes: &[u8], line_start: usize, line_end: usize) -> Option<usize> {
    let comment = (line_start..line_end)
        .find(|&i| bytes[i] == b'#' && (i == line_start || is_blank(bytes[i - 1])))
        .unwrap_or(line_end);
    (line_start..comment).rev().find(|&i| {
        if !matches!(bytes[i], b'|' | b'>') {
            return false;
        }
        let mut j = i + 1;
        while j < comment && (bytes[j].is_ascii_digit() || matches!(bytes[j], b'+' | b'-')) {
            j += 1;
        }
        j >= comment || is_blank(bytes[j]) || is_break(bytes[j])
    })
}

/// Offset of the `-` indicator in front of a block sequence's first item
/// starting at `item_start`, or `item_start` itself if there is none.
pub(crate) fn sequence_entry_start(source: &str, item_start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = item_start;
    while i > 0 && is_blank(bytes[i - 1]) {
        i -= 1;
    }
    if i > 0 && bytes[i - 1] == b'-' {
        i - 1
    } else {
        item_start
    }
}

/// End of a literal (`|`) or folded (`>`) block scalar whose header starts
/// at `start`: the end of its last non-blank content line.
pub(crate) fn block_scalar_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut header_end = start + 1;
    while header_end < bytes.len()
        && (bytes[header_end].is_ascii_digit() || matches!(bytes[header_end], b'+' | b'-'))
    {
        header_end += 1;
    }

    let minimum = block_owner_indent(bytes, start).map_or(0, |owner| owner + 1);
    let mut content_indent: Option<usize> = None;
    let mut end = header_end;
    let mut line_start = match find_byte(bytes, header_end, b'\n') {
        Some(newline) => newline + 1,
        None => return end,
    };

    while line_start < bytes.len() {
        let line_end = find_byte(bytes, line_start, b'\n').unwrap_or(bytes.len());
        let indent = bytes[line_start..line_end]
            .iter()
            .take_while(|&&b| b == b' ')
            .count();
        let content_start = line_start + indent;
        let mut text_end = line_end;
        while text_end > content_start && (is_blank(bytes[text_end - 1]) || bytes[text_end - 1] == b'\r') {
            text_end -= 1;
        }

        if text_end > content_start {
            if indent < content_indent.unwrap_or(minimum) {
                break;
            }
            content_indent.get_or_insert(indent);
            end = text_end;
        }
        line_start = line_end + 1;
    }
    end
}

/// End of an alias (`*name`) starting at `start`.
pub(crate) fn alias_end(source: &str, start: usize, in_flow: bool) -> usize {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if is_blank(b) || is_break(b) || (in_flow && is_flow_indicator(b)) {
            break;
        }
        i += 1;
    }
    i
}

/// Offset just past the closing bracket of a flow collection, searching
/// from `from` (the end of its last child).
pub(crate) fn flow_collection_end(source: &str, from: usize, closer: u8) -> usize {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b if b == closer => return i + 1,
            b'#' => match find_byte(bytes, i, b'\n') {
                Some(newline) => i = newline + 1,
                None => return bytes.len(),
            },
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Locates the value slot of a mapping entry whose key ends at `key_end`.
pub(crate) fn value_slot(source: &str, key_end: usize) -> ValueSlot {
    let bytes = source.as_bytes();
    let mut i = key_end;
    while i < bytes.len() && is_blank(bytes[i]) {
        i += 1;
    }
    if bytes.get(i) == Some(&b':') {
        return ValueSlot {
            offset: i + 1,
            has_indicator: true,
        };
    }

    // Explicit keys (`? key`) put the indicator at the start of a later line.
    while i < bytes.len() {
        match bytes[i] {
            b if is_blank(b) || is_break(b) => i += 1,
            b'#' => i = find_byte(bytes, i, b'\n').unwrap_or(bytes.len()),
            _ => break,
        }
    }
    let ends_indicator = bytes
        .get(i + 1)
        .is_none_or(|&b| is_blank(b) || is_break(b));
    if bytes.get(i) == Some(&b':') && ends_indicator {
        return ValueSlot {
            offset: i + 1,
            has_indicator: true,
        };
    }

    ValueSlot {
        offset: key_end,
        has_indicator: false,
    }
}

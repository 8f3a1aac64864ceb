//! Path-addressed editing of YAML text.
//!
//! [`edit`] parses a document, replaces the value at each dotted location
//! with the same string and serializes the result. Only the replaced values
//! change in the output; comments, key order, blank lines and the quoting of
//! every other node are kept as they were.
//!
//! Locations that do not resolve are skipped without error.
//! [`edit_with_report`] also lists which locations were applied and which
//! were missing.
//!
//! # Example
//!
//! ```
//! use yamlset::editor::edit;
//!
//! let input = "# c\napiVersion: v1\nkind: Foo\n";
//! let output = edit(input, &["kind"], "Bar").unwrap();
//! assert_eq!(output, "# c\napiVersion: v1\nkind: Bar\n");
//! ```

pub mod mutator;

use tracing::{debug, trace};

use crate::document::parser::parse_yaml;
use crate::document::serializer::serialize_tree;
use crate::error::EditError;
use crate::yamlpath::KeyPath;

pub use mutator::replace_scalar;

/// Result of an edit, with the locations sorted by outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    /// The edited document text.
    pub content: String,
    /// Locations whose value was replaced, in request order.
    pub applied: Vec<KeyPath>,
    /// Locations that did not resolve to a node.
    pub missing: Vec<KeyPath>,
}

/// Replaces the value at every dotted location in `input` with
/// `replacement`.
///
/// # Errors
///
/// Returns [`EditError::Parse`] if `input` is not a single valid YAML
/// document and [`EditError::Serialize`] if the edited tree cannot be
/// written back.
pub fn edit<P: AsRef<str>>(
    input: &str,
    locations: &[P],
    replacement: &str,
) -> Result<String, EditError> {
    edit_with_report(input, locations, replacement).map(|report| report.content)
}

/// Like [`edit`], but also reports which locations resolved.
pub fn edit_with_report<P: AsRef<str>>(
    input: &str,
    locations: &[P],
    replacement: &str,
) -> Result<EditReport, EditError> {
    let paths: Vec<KeyPath> = locations
        .iter()
        .map(|location| KeyPath::parse(location.as_ref()))
        .collect();
    apply_edits(input, &paths, replacement)
}

/// Applies already-parsed paths. Paths are handled in order; a later path
/// inside a subtree replaced by an earlier one no longer resolves.
pub fn apply_edits(
    input: &str,
    paths: &[KeyPath],
    replacement: &str,
) -> Result<EditReport, EditError> {
    let mut tree = parse_yaml(input)?;
    let mut applied = Vec::new();
    let mut missing = Vec::new();

    for path in paths {
        match tree.resolve_mut(path) {
            Some(node) => {
                trace!(%path, previous = %node.value(), "replacing value");
                replace_scalar(node, replacement);
                applied.push(path.clone());
            }
            None => {
                debug!(%path, "location not found, skipping");
                missing.push(path.clone());
            }
        }
    }

    let content = serialize_tree(&tree)?;
    debug!(
        applied = applied.len(),
        missing = missing.len(),
        "edit finished"
    );
    Ok(EditReport {
        content,
        applied,
        missing,
    })
}

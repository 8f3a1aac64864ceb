//! Key-path navigation for YAML documents.
//!
//! `YamlTree` owns the root node of one parsed document together with the
//! text it was parsed from. Nodes are addressed by [`KeyPath`]s: dotted
//! sequences of mapping keys.
//!
//! # Example
//!
//! ```
//! use yamlset::document::tree::YamlTree;
//! use yamlset::yamlpath::KeyPath;
//!
//! let tree: YamlTree = "spec:\n  image:\n    tag: v1\n".parse().unwrap();
//! let tag = tree.resolve(&KeyPath::parse("spec.image.tag")).unwrap();
//! assert_eq!(tag.value().as_str(), Some("v1"));
//!
//! assert!(tree.resolve(&KeyPath::parse("spec.image.digest")).is_none());
//! ```

use std::str::FromStr;

use super::node::YamlNode;
use crate::error::EditError;
use crate::yamlpath::{evaluator, KeyPath};

/// A complete YAML document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlTree {
    root: YamlNode,
    /// The original YAML string (reproduced for unmodified regions)
    original_source: Option<String>,
}

impl YamlTree {
    /// Creates a new YAML tree with the given root node.
    ///
    /// The tree has no original source, so it is serialized from scratch.
    pub fn new(root: YamlNode) -> Self {
        Self {
            root,
            original_source: None,
        }
    }

    /// Creates a new YAML tree with the given root node and original source.
    pub fn with_source(root: YamlNode, original_source: Option<String>) -> Self {
        Self {
            root,
            original_source,
        }
    }

    /// Returns a reference to the original YAML source, if available.
    pub fn original_source(&self) -> Option<&str> {
        self.original_source.as_deref()
    }

    pub fn root(&self) -> &YamlNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut YamlNode {
        &mut self.root
    }

    /// Gets the node at `path`, descending through mappings only.
    ///
    /// Returns `None` when a segment is missing, when a non-mapping is met
    /// before the last segment, or when the path is empty.
    pub fn resolve(&self, path: &KeyPath) -> Option<&YamlNode> {
        evaluator::resolve(&self.root, path)
    }

    /// Mutable variant of [`YamlTree::resolve`].
    pub fn resolve_mut(&mut self, path: &KeyPath) -> Option<&mut YamlNode> {
        evaluator::resolve_mut(&mut self.root, path)
    }

    /// Returns true if any node in the tree has been modified.
    pub fn is_modified(&self) -> bool {
        fn walk(node: &YamlNode) -> bool {
            use super::node::YamlValue;
            node.is_modified()
                || match node.value() {
                    YamlValue::Object(entries) => entries.values().any(walk),
                    YamlValue::Array(items) => items.iter().any(walk),
                    _ => false,
                }
        }
        walk(&self.root)
    }
}

impl FromStr for YamlTree {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parser::parse_yaml(s)
    }
}

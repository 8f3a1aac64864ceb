//! In-place value replacement.

use crate::document::node::{YamlNode, YamlString, YamlValue};

/// Overwrites `node` with a plain string scalar holding `replacement`.
///
/// Whatever the node held before (a scalar of any type, or a whole mapping
/// or sequence) is dropped. The node is marked as modified; siblings and
/// the parent are left alone. Applying the same replacement twice gives the
/// same tree as applying it once.
pub fn replace_scalar(node: &mut YamlNode, replacement: &str) {
    *node.value_mut() = YamlValue::String(YamlString::Plain(replacement.to_string()));
}

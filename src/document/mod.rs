//! YAML document model, parsing and format-preserving serialization.
//!
//! - `node`: tree nodes carrying their source position
//! - `parser`: text to [`tree::YamlTree`]
//! - `serializer`: tree back to text, splicing only modified nodes
//! - `tree`: the document tree and key-path navigation

pub mod node;
pub mod parser;
pub(crate) mod scan;
pub mod serializer;
pub mod tree;

//! Dotted key paths and their resolution against a document tree.
//!
//! A location such as `spec.values.a.image.tag` is split on `.` into a
//! [`KeyPath`]; the [`evaluator`] walks it down from the root mapping by
//! exact key equality.
//!
//! # Examples
//!
//! ```
//! // kind                      - a top-level key
//! // spec.values.a.image.tag   - a key nested five mappings deep
//! ```

pub mod ast;
pub mod evaluator;

pub use ast::KeyPath;
pub use evaluator::{resolve, resolve_mut};

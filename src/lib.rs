//! yamlset - replace values at dotted key paths in YAML documents.
//!
//! The library has two layers:
//!
//! - [`editor`]: a pure, synchronous edit of YAML text that changes only the
//!   targeted values and keeps every other byte (comments, ordering, blank
//!   lines, quoting) as it was.
//! - [`driver`]: fetches a file from a GitHub branch, edits it and commits
//!   the result, through the [`remote::ObjectStore`] trait.
//!
//! # Example
//!
//! ```
//! let input = "\
//! spec:
//!   image:
//!     ## updated by CI
//!     tag: v1
//! ";
//! let output = yamlset::edit(input, &["spec.image.tag"], "v2").unwrap();
//! assert_eq!(output, "spec:\n  image:\n    # updated by CI\n    tag: v2\n");
//! ```

pub mod config;
pub mod document;
pub mod driver;
pub mod editor;
pub mod error;
pub mod logging;
pub mod remote;
pub mod yamlpath;

pub use editor::{edit, edit_with_report, EditReport};
pub use error::EditError;
pub use yamlpath::KeyPath;

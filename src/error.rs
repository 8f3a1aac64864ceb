//! Error types for the YAML editor.

use thiserror::Error;

/// Fatal errors of a single edit. A path that does not resolve is not an
/// error; see [`crate::editor::EditReport::missing`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The input is not valid YAML, or is a YAML stream with more than one
    /// document.
    #[error("parse yaml: {message}")]
    Parse { message: String },

    /// The edited tree could not be rendered back to valid YAML.
    #[error("format yaml: {message}")]
    Serialize { message: String },
}

impl EditError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        EditError::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn serialize(message: impl Into<String>) -> Self {
        EditError::Serialize {
            message: message.into(),
        }
    }
}

//! Error types for stream-level operations.

use ironxso_core::Tag;
use ironxso_schema::{ParseError, SerializeError};
use thiserror::Error;

/// Error type for the top-level entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A top-level element matched no registered type.
    #[error("no type registered for top-level element {tag}")]
    UnknownTopLevelTag {
        /// Tag of the unmatched element.
        tag: Tag,
    },

    /// A type with the same tag is already registered.
    #[error("a type is already registered for {tag}")]
    DuplicateTag {
        /// The contested tag.
        tag: Tag,
    },

    /// Only tagged types can be registered.
    #[error("type '{type_name}' has no tag")]
    Untagged {
        /// Name of the rejected type.
        type_name: String,
    },

    /// Removal of a type that is not registered.
    #[error("no type registered for {tag}")]
    NotRegistered {
        /// Tag looked up.
        tag: Tag,
    },

    /// Non-whitespace character data between top-level elements.
    #[error("unexpected text between top-level elements")]
    UnexpectedText,

    /// Parse error of a matched element.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Serialization error.
    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),

    /// Tokenizer, writer or event stream error.
    #[error("stream error: {0}")]
    Core(#[from] ironxso_core::Error),
}

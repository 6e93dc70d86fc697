//! Error types for IronXSO core operations.

use thiserror::Error;

/// Core error type for event stream operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An end event arrived while no element was open.
    #[error("unbalanced end event at depth {depth}")]
    UnbalancedEnd {
        /// Nesting depth when the end event was observed.
        depth: usize,
    },

    /// A process reached the end of its subtree without producing a result.
    #[error("process did not complete at the end of its subtree")]
    Incomplete,

    /// An event was fed to a process that already finished or was closed.
    #[error("process is closed")]
    Closed,

    /// Error reported by the XML tokenizer.
    #[error("XML error: {message}")]
    Xml {
        /// Error message.
        message: String,
    },

    /// Error reported by an event sink while writing.
    #[error("write error: {message}")]
    Write {
        /// Error message.
        message: String,
    },

    /// A tag string could not be interpreted.
    #[error("malformed tag '{value}'")]
    MalformedTag {
        /// The offending text.
        value: String,
    },

    /// A language tag or range could not be interpreted.
    #[error("malformed language tag '{value}'")]
    MalformedLanguage {
        /// The offending text.
        value: String,
    },
}

impl Error {
    /// Creates an XML tokenizer error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Creates a sink write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Result type alias for IronXSO core operations.
pub type Result<T> = std::result::Result<T, Error>;

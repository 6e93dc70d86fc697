//! Suppressible parse error handling.

use crate::error::ParseError;
use crate::field::Field;
use ironxso_core::{Attributes, Context, Tag};

/// The raw input that caused a parse error.
#[derive(Debug, Clone, Copy)]
pub enum Raw<'a> {
    /// Nothing specific, e.g. a failed validation pass.
    None,
    /// An attribute value, or `None` if the attribute was missing.
    Attr(Option<&'a str>),
    /// Character data. For text fields this is the concatenated content.
    Text(&'a str),
    /// The start of a child element.
    Start {
        /// Child tag.
        tag: &'a Tag,
        /// Child attributes.
        attrs: &'a Attributes,
    },
}

/// One parse error offered to an [`ErrorHandler`].
#[derive(Debug, Clone, Copy)]
pub struct Failure<'a> {
    /// The field concerned, if the error is tied to one.
    pub field: Option<&'a Field>,
    /// The offending input.
    pub raw: Raw<'a>,
    /// The error, or `None` for unknown content under a fail policy.
    pub error: Option<&'a ParseError>,
    /// The context of the element being parsed.
    pub context: &'a Context,
}

/// Decision of an [`ErrorHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Continue parsing; the field becomes incomplete or the content is
    /// dropped.
    Suppress,
    /// Abort parsing of the element.
    Propagate,
}

/// Strategy deciding whether a parse error aborts the element.
pub trait ErrorHandler: Send + Sync {
    /// Inspects one failure.
    fn on_error(&self, failure: &Failure<'_>) -> Outcome;
}

impl<F> ErrorHandler for F
where
    F: Fn(&Failure<'_>) -> bool + Send + Sync,
{
    fn on_error(&self, failure: &Failure<'_>) -> Outcome {
        if self(failure) {
            Outcome::Suppress
        } else {
            Outcome::Propagate
        }
    }
}

/// Handler that suppresses every error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressAll;

impl ErrorHandler for SuppressAll {
    fn on_error(&self, failure: &Failure<'_>) -> Outcome {
        tracing::debug!(
            "suppressing parse error on {}",
            failure.field.map_or("<element>", Field::name)
        );
        Outcome::Suppress
    }
}

//! Error types for schema definition, parsing, field access and
//! serialization.

use ironxso_core::Tag;
use thiserror::Error;

/// A value failed to parse, format or coerce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValueError {
    /// Error message.
    pub message: String,
}

impl ValueError {
    /// Creates a value error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised while a type is defined or mutated. Never suppressible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Two distinct fields claim the same tag.
    #[error("ambiguous {kind} tag {tag} in type '{type_name}'")]
    AmbiguousTag {
        /// `"attribute"` or `"child"`.
        kind: &'static str,
        /// The contested tag.
        tag: Tag,
        /// Type being built.
        type_name: String,
    },

    /// More than one text field after merging.
    #[error("multiple text fields in type '{type_name}'")]
    MultipleText {
        /// Type being built.
        type_name: String,
    },

    /// More than one collector field after merging.
    #[error("multiple collector fields in type '{type_name}'")]
    MultipleCollector {
        /// Type being built.
        type_name: String,
    },

    /// The declared root tag is not a valid name.
    #[error("malformed tag '{value}'")]
    MalformedTag {
        /// The offending tag.
        value: String,
    },

    /// The type already has dependent types.
    #[error("cannot modify type '{type_name}' after it has dependent types")]
    HasDependents {
        /// Type being modified.
        type_name: String,
    },

    /// Two own fields share a name.
    #[error("duplicate field '{name}' in type '{type_name}'")]
    DuplicateField {
        /// Field name.
        name: String,
        /// Type being built.
        type_name: String,
    },

    /// A field was not found on the type.
    #[error("type '{type_name}' has no field '{name}'")]
    UnknownField {
        /// Field name.
        name: String,
        /// Type searched.
        type_name: String,
    },

    /// The field does not dispatch on child element types.
    #[error("field '{name}' does not accept child types")]
    NotChildField {
        /// Field name.
        name: String,
    },

    /// A type without a root tag was used where one is needed.
    #[error("type '{type_name}' has no tag")]
    Untagged {
        /// The untagged type.
        type_name: String,
    },
}

/// Error raised while parsing an element.
///
/// All variants except [`ParseError::Stream`] are first offered to the
/// owning type's error handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Wire text could not be parsed for a field.
    #[error("invalid value {value:?} for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Raw wire text.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A parsed value was rejected by the field's validator.
    #[error("invalid value {value:?} for '{field}': rejected by validator")]
    ValidationFailed {
        /// Field name.
        field: String,
        /// Raw wire text.
        value: String,
    },

    /// A required attribute is absent.
    #[error("missing attribute {tag}")]
    MissingAttribute {
        /// Attribute tag.
        tag: Tag,
    },

    /// A required child or text value is absent after the element ended.
    #[error("missing required member '{field}'")]
    MissingMember {
        /// Field name.
        field: String,
    },

    /// An attribute with no matching field under a fail policy.
    #[error("unexpected attribute {tag} on {element}")]
    UnknownAttribute {
        /// Attribute tag.
        tag: Tag,
        /// Element tag.
        element: Tag,
    },

    /// A child element with no matching field under a fail policy.
    #[error("unexpected child {tag} in {element}")]
    UnknownChild {
        /// Child tag.
        tag: Tag,
        /// Element tag.
        element: Tag,
    },

    /// Character data with no text field under a fail policy.
    #[error("unexpected text in {element}")]
    UnexpectedText {
        /// Element tag.
        element: Tag,
    },

    /// The type's validation hook rejected the instance.
    #[error("validation of '{type_name}' failed: {reason}")]
    Invalid {
        /// Type name.
        type_name: String,
        /// Hook message.
        reason: String,
    },

    /// The type's post-construction hook failed.
    #[error("post-construction hook of '{type_name}' failed: {reason}")]
    Hook {
        /// Type name.
        type_name: String,
        /// Hook message.
        reason: String,
    },

    /// Stream-level error.
    #[error("stream error: {0}")]
    Stream(#[from] ironxso_core::Error),
}

/// Error raised when reading or writing a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The field has no value and no default.
    #[error("'{field}': attribute is unset")]
    Unset {
        /// Field name.
        field: String,
    },

    /// A parse error for the field was suppressed.
    #[error("'{field}': attribute value is incomplete")]
    Incomplete {
        /// Field name.
        field: String,
    },

    /// A required child field may not become absent.
    #[error("value required for '{field}'")]
    Required {
        /// Field name.
        field: String,
    },

    /// A required child field has not been filled.
    #[error("'{field}': missing required member")]
    MissingMember {
        /// Field name.
        field: String,
    },

    /// The operation does not apply to this kind of field.
    #[error("'{field}' is a {kind} field")]
    WrongKind {
        /// Field name.
        field: String,
        /// Actual kind.
        kind: &'static str,
    },

    /// The field does not belong to the instance's type.
    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField {
        /// Field name.
        field: String,
        /// Type name.
        type_name: String,
    },

    /// A strict child field was given an instance of an unregistered type.
    #[error("'{field}' does not accept instances of '{type_name}'")]
    NotCandidate {
        /// Field name.
        field: String,
        /// Rejected type.
        type_name: String,
    },

    /// The value could not be coerced to the field's type.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Coercion message.
        reason: String,
    },

    /// The value was rejected by the field's validator.
    #[error("invalid value for '{field}': rejected by validator")]
    ValidationFailed {
        /// Field name.
        field: String,
    },

    /// The type's validation hook rejected the instance.
    #[error("validation of '{type_name}' failed: {reason}")]
    Invalid {
        /// Type name.
        type_name: String,
        /// Hook message.
        reason: String,
    },
}

/// Error raised while serializing an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// The instance's type has no root tag.
    #[error("type '{type_name}' has no tag and cannot be serialized")]
    Untagged {
        /// Type name.
        type_name: String,
    },

    /// A field value could not be read.
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// A field value could not be formatted.
    #[error("cannot format '{field}': {reason}")]
    Format {
        /// Field name.
        field: String,
        /// Formatter message.
        reason: String,
    },

    /// The sink rejected an event.
    #[error("sink error: {0}")]
    Sink(#[from] ironxso_core::Error),
}

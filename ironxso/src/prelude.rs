//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use ironxso::prelude::*;
//! ```

// Core types
pub use ironxso_core::error::{Error as CoreError, Result as CoreResult};
pub use ironxso_core::{
    Attributes, Context, Event, EventSink, LanguageRange, LanguageTag, Process, Step, Tag, Value,
    namespaces,
};

// Schema types
pub use ironxso_schema::{
    AccessError, DefinitionError, ErrorHandler, Failure, Field, FieldBuilder, IntegerType,
    NumericRange, Outcome, ParseError, Policies, Policy, Raw, RestrictToSet, SerializeError,
    SuppressAll, ValidateMode, ValueError, Xso, XsoFilter, XsoList, XsoProcess, XsoType, XsoTypeBuilder,
};

// Stream types
pub use ironxso_stream::{
    FnHandler, QueueHandler, StreamError, TypeRegistry, XmlWriter, XsoHandler, XsoParser,
    XsoParserBuilder, parse_one, to_string,
};

//! # IronXSO Schema
//!
//! Declarative element types and the codec built on them.
//!
//! This crate provides:
//! - Element types ([`XsoType`]) built with [`XsoTypeBuilder`], with
//!   multiple inheritance over merged field tables
//! - Field descriptors ([`Field`]) for attributes, text and child elements
//! - Value types, validators and element adapters
//! - Instances ([`Xso`]) distinguishing unset, defaulted and incomplete fields
//! - Incremental parsing ([`XsoProcess`]) with suppressible error handling
//! - Serialization into any [`ironxso_core::EventSink`]
//! - Filterable child lists ([`XsoList`])

pub mod adapters;
pub mod builder;
pub mod error;
pub mod field;
pub mod handler;
pub mod list;
pub mod parse;
pub mod schema;
pub mod serialize;
pub mod types;
pub mod validation;
pub mod xso;

pub use adapters::{ElementAdapter, FieldAdapter, KeyValueAdapter, KeyedAdapter};
pub use builder::XsoTypeBuilder;
pub use error::{AccessError, DefinitionError, ParseError, SerializeError, ValueError};
pub use field::{
    Candidates, Field, FieldBuilder, FieldId, FieldKind, KeyFn, MapKey, MissingHandler, Scalar,
    TagChoices, lang_from_context,
};
pub use handler::{ErrorHandler, Failure, Outcome, Raw, SuppressAll};
pub use list::{FilterCursor, XsoFilter, XsoList};
pub use parse::{ElementProcess, XsoProcess};
pub use schema::{AfterLoadHook, NamespaceMap, Policies, Policy, ValidateHook, XsoType};
pub use types::{BoolType, IntegerType, LanguageType, StringType, TagType, ValueType, ValueTypeRef};
pub use validation::{NumericRange, RestrictToSet, ValidateMode, Validator};
pub use xso::Xso;

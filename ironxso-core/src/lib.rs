//! # IronXSO Core
//!
//! Core types and traits for the IronXSO XML stream object codec.
//!
//! This crate provides:
//! - Qualified names ([`Tag`]) and the event vocabulary ([`Event`], [`EventSink`])
//! - Dynamically typed field values ([`Value`])
//! - Language tags, language ranges and RFC 4647 lookup
//! - The parse [`Context`] propagated to nested elements
//! - The incremental [`Process`] abstraction
//! - Event adapters: subtree guard, capture relay, drop consumer, replay and
//!   the push-to-pull driver

pub mod adapt;
pub mod context;
pub mod error;
pub mod event;
pub mod lang;
pub mod process;
pub mod tag;
pub mod value;

pub use adapt::{CaptureRelay, DropConsumer, Guard, PushDriver, replay};
pub use context::Context;
pub use error::{Error, Result};
pub use event::{Attributes, Event, EventSink};
pub use lang::{LanguageRange, LanguageTag, lookup_language};
pub use process::{Process, Step, run};
pub use tag::{Tag, namespaces};
pub use value::Value;

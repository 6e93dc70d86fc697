//! # IronXSO Stream
//!
//! Top-level entry point for parsing streams of XML elements into XSO
//! instances.
//!
//! This crate provides:
//! - [`XsoParser`], dispatching top-level elements to registered types
//! - [`XsoParserBuilder`] for configuring the parser
//! - Handler traits receiving parsed instances
//! - A shared [`TypeRegistry`] of top-level types
//! - quick-xml glue: [`read_events`] and [`XmlWriter`]

pub mod builder;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;
pub mod xml;

pub use builder::XsoParserBuilder;
pub use dispatcher::XsoParser;
pub use error::StreamError;
pub use handler::{FnHandler, QueueHandler, XsoHandler};
pub use registry::{Registration, TypeRegistry};
pub use xml::{XmlWriter, parse_events, parse_one, read_events, to_string};

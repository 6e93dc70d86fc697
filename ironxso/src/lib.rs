//! # IronXSO
//!
//! Declarative XML stream objects for Rust.
//!
//! Message types are declared once as element types with field
//! descriptors. IronXSO then parses streamed element/text events into typed
//! instances, event by event, and serializes instances back into the same
//! event vocabulary.
//!
//! ## Features
//!
//! - **Declarative schemas** - attributes, text, child elements, child
//!   lists and maps, flags, enumerated tags and captured foreign content
//! - **Multiple inheritance** - field tables merge across bases, rejecting
//!   ambiguous tag claims at definition time
//! - **Incremental parsing** - one event at a time, with unknown-content
//!   policies and suppressible errors that never desynchronize the stream
//! - **Language propagation** - `xml:lang` is inherited by nested elements
//! - **Lossless round trips** - unmodeled subtrees are captured and replayed
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironxso::prelude::*;
//!
//! let message = XsoTypeBuilder::new("Message")
//!     .tag(("jabber:client", "message"))
//!     .field(Field::attr("to", "to").build())
//!     .field(Field::child_text("body", ("jabber:client", "body")).default("").build())
//!     .build()?;
//!
//! let mut parser = XsoParserBuilder::new()
//!     .handle_fn(&message, |msg| println!("{:?}", msg))
//!     .build()?;
//! parser.feed_str(r#"<message xmlns="jabber:client" to="juliet"><body>hi</body></message>"#)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Tags, events, values, language tags and event adapters
//! - [`schema`] - Element types, field descriptors, parsing and serialization
//! - [`stream`] - Top-level dispatcher and quick-xml glue

pub mod prelude;

/// Tags, events, values, language tags and event adapters.
pub mod core {
    pub use ironxso_core::*;
}

/// Element types, field descriptors, parsing and serialization.
pub mod schema {
    pub use ironxso_schema::*;
}

/// Top-level dispatcher and quick-xml glue.
pub mod stream {
    pub use ironxso_stream::*;
}

// Re-export commonly used items at the crate root
pub use ironxso_core::{Attributes, Context, Event, EventSink, LanguageRange, LanguageTag, Tag, Value};
pub use ironxso_schema::{Field, Xso, XsoFilter, XsoList, XsoType, XsoTypeBuilder};
pub use ironxso_stream::{XmlWriter, XsoParser, XsoParserBuilder, parse_one, to_string};

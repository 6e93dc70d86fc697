//! Message types and sample streams shared by the benchmarks.

use ironxso_core::{LanguageTag, Tag, Value};
use ironxso_schema::{AccessError, DefinitionError, Field, IntegerType, Xso, XsoType, XsoTypeBuilder};
use ironxso_schema::SerializeError;
use ironxso_stream::{StreamError, to_string};

/// Namespace of the benchmark messages.
pub const NS: &str = "jabber:client";

/// A chat message type with a nested delay element.
#[derive(Debug, Clone)]
pub struct ChatTypes {
    /// The top-level `<message/>` type.
    pub message: XsoType,
    /// The `<delay/>` child type.
    pub delay: XsoType,
}

impl ChatTypes {
    /// Defines the benchmark types.
    ///
    /// # Errors
    /// Returns the definition error, which only happens if the fixture is
    /// broken.
    pub fn new() -> Result<Self, DefinitionError> {
        let delay = XsoTypeBuilder::new("Delay")
            .tag(("urn:xmpp:delay", "delay"))
            .field(Field::attr("stamp", "stamp").build())
            .field(Field::text("reason").default("").build())
            .build()?;
        let message = XsoTypeBuilder::new("Message")
            .tag((NS, "message"))
            .field(Field::attr("id", "id").build())
            .field(Field::attr("to", "to").build())
            .field(Field::attr("from", "from").default(Value::None).build())
            .field(
                Field::attr("seq", "seq")
                    .value_type(IntegerType)
                    .default(0)
                    .build(),
            )
            .field(Field::lang_attr("lang").build())
            .field(Field::child_text("body", (NS, "body")).default("").build())
            .field(Field::child_text("thread", (NS, "thread")).default(Value::None).build())
            .field(Field::child("delay", &[&delay]).build())
            .field(
                Field::child_tag("state", Some("http://jabber.org/protocol/chatstates"), &[
                    "active",
                    "composing",
                    "paused",
                ])
                .allow_none()
                .build(),
            )
            .field(Field::collector("extensions").build())
            .build()?;
        Ok(Self { message, delay })
    }

    /// Builds message number `n`.
    ///
    /// # Errors
    /// Returns a field access error if the fixture is broken.
    pub fn sample(&self, n: i64) -> Result<Xso, AccessError> {
        let mut xso = Xso::new(&self.message);
        xso.set_by_name("id", format!("msg-{}", n))?;
        xso.set_by_name("to", "juliet@capulet.example/balcony")?;
        xso.set_by_name("from", "romeo@montague.example/garden")?;
        xso.set_by_name("seq", n)?;
        if let Ok(lang) = LanguageTag::parse("en") {
            xso.set_by_name("lang", lang)?;
        }
        xso.set_by_name("body", "Art thou not Romeo, and a Montague? <3 & more")?;
        xso.set_by_name(
            "state",
            Tag::qualified("http://jabber.org/protocol/chatstates", "active"),
        )?;
        if n % 2 == 0 {
            let mut delay = Xso::new(&self.delay);
            delay.set_by_name("stamp", "2002-09-10T23:08:25Z")?;
            delay.set_by_name("reason", "Offline storage")?;
            let field = xso.field("delay")?;
            xso.set_child(&field, Some(delay))?;
        }
        Ok(xso)
    }

    /// Renders `count` messages as one XML stream.
    ///
    /// # Errors
    /// Returns the serialization error if the fixture is broken.
    pub fn stream(&self, count: i64) -> Result<String, StreamError> {
        let mut out = String::new();
        for n in 0..count {
            let sample = self.sample(n).map_err(SerializeError::from)?;
            out.push_str(&to_string(&sample)?);
            out.push('\n');
        }
        Ok(out)
    }
}

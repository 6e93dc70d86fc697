//! The event vocabulary consumed and produced by the codec.
//!
//! A document is a depth-first, well-nested sequence of [`Event::Start`],
//! [`Event::Text`] and [`Event::End`]. Parsers consume it one event at a time;
//! serializers produce it through an [`EventSink`].

use crate::error::Result;
use crate::tag::Tag;

/// Attributes of one element, in wire order.
///
/// Wire order is preserved because attribute processing order is observable
/// through error handling (attributes after a suppressed failure are marked
/// incomplete).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(Tag, String)>,
}

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an existing value for the same tag.
    pub fn insert(&mut self, tag: impl Into<Tag>, value: impl Into<String>) {
        let tag = tag.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// Builder-style variant of [`Attributes::insert`].
    #[must_use]
    pub fn with(mut self, tag: impl Into<Tag>, value: impl Into<String>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn get(&self, tag: &Tag) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(tag, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &str)> {
        self.entries.iter().map(|(t, v)| (t, v.as_str()))
    }
}

impl<T: Into<Tag>, V: Into<String>> FromIterator<(T, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (tag, value) in iter {
            attrs.insert(tag, value);
        }
        attrs
    }
}

/// One low-level stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An element starts.
    Start {
        /// Element tag.
        tag: Tag,
        /// Element attributes.
        attrs: Attributes,
    },
    /// A fragment of character data.
    Text(String),
    /// The innermost open element ends.
    End,
}

impl Event {
    /// Creates a start event.
    #[must_use]
    pub fn start(tag: impl Into<Tag>, attrs: Attributes) -> Self {
        Self::Start {
            tag: tag.into(),
            attrs,
        }
    }

    /// Creates a text event.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns true for start events.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(self, Self::Start { .. })
    }

    /// Returns true for end events.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

/// Receiver of a serialized event stream.
pub trait EventSink {
    /// Opens an element.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the event.
    fn start(&mut self, tag: &Tag, attrs: &Attributes) -> Result<()>;

    /// Emits character data.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the event.
    fn text(&mut self, text: &str) -> Result<()>;

    /// Closes the innermost element.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the event.
    fn end(&mut self) -> Result<()>;

    /// Requests a namespace declaration on the next opened element. `None`
    /// declares the default namespace. Sinks without prefix handling ignore
    /// it.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the declaration.
    fn declare_prefix(&mut self, _prefix: Option<&str>, _namespace: &str) -> Result<()> {
        Ok(())
    }

    /// Forwards an owned event to the matching method.
    ///
    /// # Errors
    /// Returns an error if the sink cannot accept the event.
    fn event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Start { tag, attrs } => self.start(tag, attrs),
            Event::Text(text) => self.text(text),
            Event::End => self.end(),
        }
    }
}

impl EventSink for Vec<Event> {
    fn start(&mut self, tag: &Tag, attrs: &Attributes) -> Result<()> {
        self.push(Event::Start {
            tag: tag.clone(),
            attrs: attrs.clone(),
        });
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        // adjacent fragments are merged so captured and re-emitted text
        // compare equal regardless of how the tokenizer split it
        if let Some(Event::Text(last)) = self.last_mut() {
            last.push_str(text);
        } else {
            self.push(Event::Text(text.to_string()));
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.push(Event::End);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_preserve_wire_order() {
        let attrs = Attributes::new().with("b", "1").with("a", "2");
        let keys: Vec<_> = attrs.iter().map(|(t, _)| t.local_name()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_attributes_insert_replaces() {
        let mut attrs = Attributes::new().with("a", "1");
        attrs.insert("a", "2");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get(&Tag::local("a")), Some("2"));
    }

    #[test]
    fn test_vec_sink_merges_text() {
        let mut sink: Vec<Event> = Vec::new();
        sink.start(&Tag::local("a"), &Attributes::new()).unwrap();
        sink.text("foo").unwrap();
        sink.text("bar").unwrap();
        sink.end().unwrap();
        assert_eq!(
            sink,
            vec![
                Event::start("a", Attributes::new()),
                Event::text("foobar"),
                Event::End
            ]
        );
    }
}

//! quick-xml glue: tokenizing XML text into events and rendering events as
//! XML text.

use crate::dispatcher::XsoParser;
use crate::error::StreamError;
use crate::handler::QueueHandler;
use ironxso_core::{Attributes, Error, Event, EventSink, Tag, namespaces};
use ironxso_schema::{Xso, XsoType};
use quick_xml::escape::{escape, resolve_xml_entity};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::io::Cursor;

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::xml(e.to_string())
}

fn utf8(bytes: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(bytes).map_err(xml_error)
}

fn resolve_namespace(resolve: ResolveResult<'_>) -> Result<Option<String>, Error> {
    match resolve {
        ResolveResult::Bound(ns) => Ok(Some(utf8(ns.as_ref())?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::xml(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn resolve_entity(raw: &str) -> Result<String, Error> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }
    let code = match raw.strip_prefix('#') {
        Some(rest) => match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        },
        None => None,
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| Error::xml(format!("unknown entity &{raw};")))
}

fn attributes<R>(reader: &NsReader<R>, start: &BytesStart<'_>) -> Result<Attributes, Error> {
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = attr.key;
        if key.as_ref() == b"xmlns" {
            continue;
        }
        let namespace = match key.prefix() {
            Some(prefix) if prefix.as_ref() == b"xmlns" => continue,
            Some(prefix) if prefix.as_ref() == b"xml" => Some(namespaces::XML.to_string()),
            _ => {
                let (resolve, _) = reader.resolver().resolve_attribute(key);
                resolve_namespace(resolve)?
            }
        };
        let local = utf8(key.local_name().as_ref())?.to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(xml_error)?;
        attrs.insert(Tag::new(namespace.as_deref(), local), value.into_owned());
    }
    Ok(attrs)
}

/// Tokenizes XML text and hands each event to `on_event`.
///
/// The input may hold any number of top-level elements. Namespaces are
/// resolved; comments, processing instructions and declarations are
/// skipped; empty elements produce a start and an end event.
///
/// # Errors
/// Returns [`Error::Xml`] for malformed input, or the first error returned
/// by `on_event`.
pub fn read_events<F, E>(input: &str, mut on_event: F) -> Result<(), E>
where
    F: FnMut(Event) -> Result<(), E>,
    E: From<Error>,
{
    let mut reader = NsReader::from_reader(Cursor::new(input.as_bytes()));
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let (resolve, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(xml_error)?;
        match event {
            XmlEvent::Start(ref e) | XmlEvent::Empty(ref e) => {
                let namespace = resolve_namespace(resolve)?;
                let local = utf8(e.local_name().as_ref())?.to_string();
                let attrs = attributes(&reader, e)?;
                on_event(Event::Start {
                    tag: Tag::new(namespace.as_deref(), local),
                    attrs,
                })?;
                if matches!(event, XmlEvent::Empty(_)) {
                    on_event(Event::End)?;
                }
            }
            XmlEvent::End(_) => on_event(Event::End)?,
            XmlEvent::Text(e) => {
                let text = e.decode().map_err(xml_error)?;
                if !text.is_empty() {
                    on_event(Event::text(text.into_owned()))?;
                }
            }
            XmlEvent::CData(e) => {
                let text = utf8(e.as_ref())?;
                if !text.is_empty() {
                    on_event(Event::text(text))?;
                }
            }
            XmlEvent::GeneralRef(e) => {
                let raw = e.decode().map_err(xml_error)?;
                on_event(Event::text(resolve_entity(&raw)?))?;
            }
            XmlEvent::Decl(_) | XmlEvent::Comment(_) | XmlEvent::PI(_) | XmlEvent::DocType(_) => {}
            XmlEvent::Eof => return Ok(()),
        }
    }
}

/// Tokenizes XML text into an event list.
///
/// # Errors
/// Returns [`Error::Xml`] for malformed input.
pub fn parse_events(input: &str) -> Result<Vec<Event>, Error> {
    let mut events: Vec<Event> = Vec::new();
    read_events(input, |event| events.event(&event))?;
    Ok(events)
}

impl XsoParser {
    /// Tokenizes XML text and feeds the events into the parser.
    ///
    /// Elements may be split across calls only at top-level boundaries;
    /// each call must contain balanced markup.
    ///
    /// A parse error does not stop tokenizing: the rest of the failed
    /// element is skipped and later elements are still parsed.
    ///
    /// # Errors
    /// Returns the first parse error, or a tokenizer error if the markup is
    /// malformed. Tokenizing stops at malformed markup.
    pub fn feed_str(&mut self, input: &str) -> Result<(), StreamError> {
        let mut first: Option<StreamError> = None;
        let read = read_events(input, |event| {
            if let Err(e) = self.feed(event) {
                tracing::debug!("top-level element failed: {}", e);
                first.get_or_insert(e);
            }
            Ok::<(), StreamError>(())
        });
        match first {
            Some(e) => Err(e),
            None => read,
        }
    }
}

/// Parses the first top-level element of `input` as an instance of `ty`.
///
/// # Errors
/// Returns the tokenizer or parse error, [`StreamError::UnknownTopLevelTag`]
/// if the element is not of `ty`, or [`Error::Incomplete`] if `input` holds
/// no complete element.
pub fn parse_one(ty: &XsoType, input: &str) -> Result<Xso, StreamError> {
    let mut parser = XsoParser::new();
    let queue = QueueHandler::new();
    parser.add_type(ty, queue.clone())?;
    parser.feed_str(input)?;
    parser.close();
    queue
        .drain()
        .into_iter()
        .next()
        .ok_or_else(|| Error::Incomplete.into())
}

/// Serializes an instance as XML text.
///
/// # Errors
/// Returns the serialization error.
pub fn to_string(xso: &Xso) -> Result<String, StreamError> {
    let mut writer = XmlWriter::new();
    xso.serialize(&mut writer)?;
    Ok(writer.into_string())
}

#[derive(Debug)]
struct Scope {
    local: String,
    default_ns: Option<String>,
    prefixes: Vec<(String, String)>,
}

/// Event sink rendering XML text.
///
/// Elements are always written unprefixed, declaring the default namespace
/// where it changes. Namespaced attributes use a prefix declared through
/// [`EventSink::declare_prefix`] when one is in scope and a generated one
/// otherwise. Elements without content are self-closed.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    scopes: Vec<Scope>,
    pending: Vec<(Option<String>, String)>,
    open_start: bool,
    generated: usize,
}

impl XmlWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consumes the writer, returning the text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    /// Returns true if every opened element has been closed.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.scopes.is_empty()
    }

    fn close_start(&mut self) {
        if self.open_start {
            self.out.push('>');
            self.open_start = false;
        }
    }

    /// Finds the innermost prefix bound to `namespace` that is not shadowed.
    fn prefix_for(&self, namespace: &str, own: &[(String, String)]) -> Option<String> {
        let mut seen: Vec<&str> = Vec::new();
        let bindings = own
            .iter()
            .chain(self.scopes.iter().rev().flat_map(|s| s.prefixes.iter()));
        for (prefix, bound) in bindings {
            if seen.contains(&prefix.as_str()) {
                continue;
            }
            if bound == namespace {
                return Some(prefix.clone());
            }
            seen.push(prefix);
        }
        None
    }

    fn fresh_prefix(&mut self, own: &[(String, String)]) -> String {
        loop {
            let prefix = format!("ns{}", self.generated);
            self.generated += 1;
            let taken = own
                .iter()
                .chain(self.scopes.iter().flat_map(|s| s.prefixes.iter()))
                .any(|(p, _)| *p == prefix);
            if !taken {
                return prefix;
            }
        }
    }
}

impl EventSink for XmlWriter {
    fn start(&mut self, tag: &Tag, attrs: &Attributes) -> ironxso_core::Result<()> {
        self.close_start();
        let inherited = self.scopes.last().and_then(|s| s.default_ns.clone());

        let mut prefixes = Vec::new();
        for (prefix, namespace) in std::mem::take(&mut self.pending) {
            if let Some(prefix) = prefix {
                prefixes.push((prefix, namespace));
            }
        }
        let declared = prefixes.len();

        let mut rendered = Vec::with_capacity(attrs.len());
        for (attr, value) in attrs.iter() {
            let name = match attr.namespace() {
                None => attr.local_name().to_string(),
                Some(namespaces::XML) => format!("xml:{}", attr.local_name()),
                Some(namespace) => {
                    let prefix = match self.prefix_for(namespace, &prefixes) {
                        Some(prefix) => prefix,
                        None => {
                            let prefix = self.fresh_prefix(&prefixes);
                            prefixes.push((prefix.clone(), namespace.to_string()));
                            prefix
                        }
                    };
                    format!("{}:{}", prefix, attr.local_name())
                }
            };
            rendered.push((name, value));
        }
        if prefixes.len() > declared {
            tracing::trace!("generated {} attribute prefixes", prefixes.len() - declared);
        }

        let default_ns = tag.namespace().map(str::to_string);
        self.out.push('<');
        self.out.push_str(tag.local_name());
        if default_ns != inherited {
            self.out.push_str(" xmlns=\"");
            self.out.push_str(&escape(default_ns.as_deref().unwrap_or("")));
            self.out.push('"');
        }
        for (prefix, namespace) in &prefixes {
            self.out.push_str(" xmlns:");
            self.out.push_str(prefix);
            self.out.push_str("=\"");
            self.out.push_str(&escape(namespace.as_str()));
            self.out.push('"');
        }
        for (name, value) in rendered {
            self.out.push(' ');
            self.out.push_str(&name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }

        self.scopes.push(Scope {
            local: tag.local_name().to_string(),
            default_ns,
            prefixes,
        });
        self.open_start = true;
        Ok(())
    }

    fn text(&mut self, text: &str) -> ironxso_core::Result<()> {
        if self.scopes.is_empty() {
            return Err(Error::write("text outside of an element"));
        }
        self.close_start();
        self.out.push_str(&escape(text));
        Ok(())
    }

    fn end(&mut self) -> ironxso_core::Result<()> {
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| Error::write("end without an open element"))?;
        if self.open_start {
            self.out.push_str("/>");
            self.open_start = false;
        } else {
            self.out.push_str("</");
            self.out.push_str(&scope.local);
            self.out.push('>');
        }
        Ok(())
    }

    fn declare_prefix(&mut self, prefix: Option<&str>, namespace: &str) -> ironxso_core::Result<()> {
        self.pending
            .push((prefix.map(str::to_string), namespace.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironxso_core::replay;

    fn start(tag: impl Into<Tag>, attrs: &[(Tag, &str)]) -> Event {
        Event::start(tag, attrs.iter().cloned().collect())
    }

    #[test]
    fn test_read_events_resolves_namespaces() {
        let events = parse_events(
            r#"<m xmlns="jabber:client" xmlns:x="urn:x" x:a="1" xml:lang="en" b="&lt;&#65;"><body>hi &amp; bye</body><e/></m>"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                start(
                    ("jabber:client", "m"),
                    &[
                        (Tag::qualified("urn:x", "a"), "1"),
                        (Tag::xml_lang(), "en"),
                        (Tag::local("b"), "<A"),
                    ]
                ),
                start(("jabber:client", "body"), &[]),
                Event::text("hi & bye"),
                Event::End,
                start(("jabber:client", "e"), &[]),
                Event::End,
                Event::End,
            ]
        );
    }

    #[test]
    fn test_read_events_reports_malformed_input() {
        assert!(matches!(
            parse_events("<a><b></a>"),
            Err(Error::Xml { .. })
        ));
        assert!(matches!(parse_events("<p:a/>"), Err(Error::Xml { .. })));
    }

    #[test]
    fn test_writer_declares_default_namespace_on_change() {
        let events = vec![
            start(("urn:a", "root"), &[]),
            start(("urn:a", "child"), &[]),
            Event::End,
            start(("urn:b", "other"), &[]),
            Event::text("x < y"),
            Event::End,
            start("plain", &[]),
            Event::End,
            Event::End,
        ];
        let mut writer = XmlWriter::new();
        replay(&events, &mut writer).unwrap();
        assert!(writer.is_balanced());
        assert_eq!(
            writer.as_str(),
            r#"<root xmlns="urn:a"><child/><other xmlns="urn:b">x &lt; y</other><plain xmlns=""/></root>"#
        );
    }

    #[test]
    fn test_writer_prefixes_attributes() {
        let mut writer = XmlWriter::new();
        writer.declare_prefix(Some("x"), "urn:x").unwrap();
        writer
            .start(
                &Tag::local("a"),
                &Attributes::new()
                    .with(Tag::qualified("urn:x", "one"), "1")
                    .with(Tag::qualified("urn:y", "two"), "\"2\"")
                    .with(Tag::xml_lang(), "de"),
            )
            .unwrap();
        writer
            .start(&Tag::local("b"), &Attributes::new().with(Tag::qualified("urn:x", "three"), "3"))
            .unwrap();
        writer.end().unwrap();
        writer.end().unwrap();
        assert_eq!(
            writer.into_string(),
            r#"<a xmlns:x="urn:x" xmlns:ns0="urn:y" x:one="1" ns0:two="&quot;2&quot;" xml:lang="de"><b x:three="3"/></a>"#
        );
    }

    #[test]
    fn test_written_text_reads_back() {
        let events = vec![
            start(
                ("urn:a", "root"),
                &[(Tag::qualified("urn:b", "attr"), "a&b"), (Tag::local("plain"), "<>")],
            ),
            Event::text("text & more"),
            start("inner", &[]),
            Event::End,
            Event::End,
        ];
        let mut writer = XmlWriter::new();
        replay(&events, &mut writer).unwrap();
        assert_eq!(parse_events(writer.as_str()).unwrap(), events);
    }

    #[test]
    fn test_writer_rejects_unbalanced_end() {
        let mut writer = XmlWriter::new();
        assert!(matches!(writer.end(), Err(Error::Write { .. })));
        assert!(writer.text("x").is_err());
    }
}

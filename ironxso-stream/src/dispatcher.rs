//! Top-level dispatcher routing elements to registered types.

use crate::error::StreamError;
use crate::handler::{FnHandler, XsoHandler};
use crate::registry::TypeRegistry;
use ironxso_core::{Attributes, Context, Event, LanguageTag, Process, PushDriver, Step, Tag};
use ironxso_schema::{Xso, XsoProcess, XsoType};
use std::sync::Arc;

/// One top-level element: the type is chosen by its start event.
enum Dispatch {
    Pending {
        registry: Arc<TypeRegistry>,
        ctx: Context,
    },
    Parsing {
        process: XsoProcess,
        handler: Arc<dyn XsoHandler>,
    },
}

impl Dispatch {
    fn advance(
        process: &mut XsoProcess,
        handler: &Arc<dyn XsoHandler>,
        event: Event,
    ) -> Result<Step<(Xso, Arc<dyn XsoHandler>)>, StreamError> {
        match process.feed(event) {
            Ok(step) => Ok(step.map(|xso| (xso, Arc::clone(handler)))),
            Err(e) => {
                handler.on_error(&e);
                Err(e.into())
            }
        }
    }
}

impl Process for Dispatch {
    type Output = (Xso, Arc<dyn XsoHandler>);
    type Error = StreamError;

    fn feed(&mut self, event: Event) -> Result<Step<Self::Output>, StreamError> {
        match self {
            Self::Pending { registry, ctx } => {
                let Event::Start { tag, .. } = &event else {
                    return Err(StreamError::UnexpectedText);
                };
                let Some(registration) = registry.lookup(tag) else {
                    tracing::warn!("no type registered for top-level element {}", tag);
                    return Err(StreamError::UnknownTopLevelTag { tag: tag.clone() });
                };
                tracing::trace!("parsing {} as '{}'", tag, registration.ty.name());
                let mut process = XsoProcess::new(&registration.ty, ctx);
                let step = Self::advance(&mut process, &registration.handler, event)?;
                *self = Self::Parsing {
                    process,
                    handler: registration.handler,
                };
                Ok(step)
            }
            Self::Parsing { process, handler } => Self::advance(process, handler, event),
        }
    }

    fn close(&mut self) {
        if let Self::Parsing { process, .. } = self {
            process.close();
        }
    }
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Parses a stream of top-level elements into instances of registered
/// types.
///
/// Each top-level element is matched by tag against the registered types
/// and parsed under the parser's context; the finished instance goes to
/// the type's handler. Whitespace between top-level elements is ignored.
///
/// After an error the parser stays usable: the rest of the failed element
/// is skipped and the next top-level element starts a fresh parse.
pub struct XsoParser {
    registry: Arc<TypeRegistry>,
    ctx: Context,
    driver: PushDriver<Dispatch>,
}

impl XsoParser {
    /// Creates a parser with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(TypeRegistry::new()))
    }

    /// Creates a parser using a shared registry.
    #[must_use]
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            ctx: Context::new(),
            driver: PushDriver::new(),
        }
    }

    /// The registry consulted for each top-level element.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Registers a top-level type.
    ///
    /// # Errors
    /// Returns [`StreamError::Untagged`] or [`StreamError::DuplicateTag`].
    pub fn add_type<H: XsoHandler + 'static>(
        &self,
        ty: &XsoType,
        handler: H,
    ) -> Result<(), StreamError> {
        self.registry.register(ty, Arc::new(handler))
    }

    /// Registers a top-level type with a closure handler.
    ///
    /// # Errors
    /// See [`XsoParser::add_type`].
    pub fn add_type_fn<F>(&self, ty: &XsoType, f: F) -> Result<(), StreamError>
    where
        F: Fn(Xso) + Send + Sync + 'static,
    {
        self.add_type(ty, FnHandler::new(f))
    }

    /// Removes a top-level type. An element of that type already being
    /// parsed still completes.
    ///
    /// # Errors
    /// Returns [`StreamError::NotRegistered`] if the type is not registered.
    pub fn remove_type(&self, ty: &XsoType) -> Result<(), StreamError> {
        self.registry.unregister(ty).map(|_| ())
    }

    /// Returns true if the type is registered.
    #[must_use]
    pub fn has_type(&self, ty: &XsoType) -> bool {
        self.registry.contains(ty)
    }

    /// The language top-level elements inherit.
    #[must_use]
    pub fn lang(&self) -> Option<&LanguageTag> {
        self.ctx.lang.as_ref()
    }

    /// Sets the language inherited by subsequent top-level elements. An
    /// element already being parsed keeps the language it started with.
    pub fn set_lang(&mut self, lang: Option<LanguageTag>) {
        self.ctx.lang = lang;
    }

    /// The context seeded into each top-level element.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Mutable access to the context seeded into each top-level element.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Feeds one event.
    ///
    /// # Errors
    /// Returns [`StreamError::UnknownTopLevelTag`] for an unmatched
    /// top-level element (the element is then skipped),
    /// [`StreamError::UnexpectedText`] for non-whitespace text between
    /// elements, or the parse error of the current element.
    pub fn feed(&mut self, event: Event) -> Result<(), StreamError> {
        if self.driver.is_idle() {
            match &event {
                Event::Text(text) if is_whitespace(text) => return Ok(()),
                Event::Text(_) => return Err(StreamError::UnexpectedText),
                Event::Start { .. } | Event::End => {}
            }
        }

        let registry = &self.registry;
        let ctx = &self.ctx;
        let completed = self.driver.feed(event, || Dispatch::Pending {
            registry: Arc::clone(registry),
            ctx: ctx.clone(),
        })?;
        if let Some((xso, handler)) = completed {
            tracing::trace!("top-level element '{}' complete", xso.xso_type().name());
            handler.on_xso(xso);
        }
        Ok(())
    }

    /// Low-level start callback.
    ///
    /// # Errors
    /// See [`XsoParser::feed`].
    pub fn start_element(&mut self, tag: Tag, attrs: Attributes) -> Result<(), StreamError> {
        self.feed(Event::Start { tag, attrs })
    }

    /// Low-level character data callback.
    ///
    /// # Errors
    /// See [`XsoParser::feed`].
    pub fn characters(&mut self, text: &str) -> Result<(), StreamError> {
        self.feed(Event::text(text))
    }

    /// Low-level end callback.
    ///
    /// # Errors
    /// See [`XsoParser::feed`].
    pub fn end_element(&mut self) -> Result<(), StreamError> {
        self.feed(Event::End)
    }

    /// Closes the stream. An element still being parsed is discarded.
    pub fn close(&mut self) {
        if !self.driver.is_idle() {
            tracing::debug!("closing parser inside an element at depth {}", self.depth());
        }
        self.driver.close();
    }

    /// Returns true between top-level elements.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.driver.is_idle()
    }

    /// Current element nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.driver.depth()
    }
}

impl Default for XsoParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::QueueHandler;
    use ironxso_core::Value;
    use ironxso_schema::{Field, ParseError, XsoTypeBuilder};

    fn start(tag: &str, attrs: &[(&str, &str)]) -> Event {
        Event::start(tag, attrs.iter().copied().collect())
    }

    fn message_type() -> XsoType {
        XsoTypeBuilder::new("Message")
            .tag("message")
            .field(Field::attr("to", "to").build())
            .field(Field::lang_attr("lang").build())
            .build()
            .unwrap()
    }

    fn parser_with(ty: &XsoType) -> (XsoParser, QueueHandler) {
        let parser = XsoParser::new();
        let queue = QueueHandler::new();
        parser.add_type(ty, queue.clone()).unwrap();
        (parser, queue)
    }

    #[test]
    fn test_dispatches_top_level_elements() {
        let ty = message_type();
        let (mut parser, queue) = parser_with(&ty);

        parser.feed(start("message", &[("to", "a")])).unwrap();
        assert!(!parser.is_idle());
        parser.feed(Event::End).unwrap();
        parser.feed(Event::text("\n  ")).unwrap();
        parser.feed(start("message", &[("to", "b")])).unwrap();
        parser.feed(Event::End).unwrap();

        let parsed = queue.drain();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].get_by_name("to").unwrap(), Value::from("b"));
        assert!(parser.is_idle());
    }

    #[test]
    fn test_unknown_top_level_tag_is_skipped() {
        let ty = message_type();
        let (mut parser, queue) = parser_with(&ty);

        assert!(matches!(
            parser.feed(start("presence", &[])),
            Err(StreamError::UnknownTopLevelTag { .. })
        ));
        parser.feed(start("status", &[])).unwrap();
        parser.feed(Event::text("away")).unwrap();
        parser.feed(Event::End).unwrap();
        parser.feed(Event::End).unwrap();
        assert!(parser.is_idle());

        parser.feed(start("message", &[("to", "a")])).unwrap();
        parser.feed(Event::End).unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_text_between_elements() {
        let mut parser = XsoParser::new();
        parser.feed(Event::text(" \t\r\n")).unwrap();
        assert_eq!(parser.feed(Event::text("x")), Err(StreamError::UnexpectedText));
    }

    #[test]
    fn test_parse_error_reaches_handler_and_caller() {
        struct Errors(Arc<parking_lot::Mutex<Vec<ParseError>>>);

        impl XsoHandler for Errors {
            fn on_xso(&self, _xso: Xso) {}

            fn on_error(&self, error: &ParseError) {
                self.0.lock().push(error.clone());
            }
        }

        let ty = message_type();
        let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut parser = XsoParser::new();
        parser.add_type(&ty, Errors(Arc::clone(&errors))).unwrap();

        assert!(matches!(
            parser.feed(start("message", &[])),
            Err(StreamError::Parse(ParseError::MissingAttribute { .. }))
        ));
        assert_eq!(errors.lock().len(), 1);
        parser.feed(Event::End).unwrap();
        assert!(parser.is_idle());
    }

    #[test]
    fn test_language_applies_to_next_element() {
        let ty = message_type();
        let (mut parser, queue) = parser_with(&ty);
        parser.set_lang(Some(LanguageTag::parse("de").unwrap()));
        assert_eq!(parser.lang().map(LanguageTag::as_str), Some("de"));

        parser.feed(start("message", &[("to", "a")])).unwrap();
        parser.set_lang(Some(LanguageTag::parse("fr").unwrap()));
        parser.feed(Event::End).unwrap();
        parser.feed(start("message", &[("to", "b")])).unwrap();
        parser.feed(Event::End).unwrap();

        let langs: Vec<_> = queue
            .drain()
            .iter()
            .map(|x| x.lang().map(|l| l.as_str().to_string()))
            .collect();
        assert_eq!(langs, vec![Some("de".to_string()), Some("fr".to_string())]);
    }

    #[test]
    fn test_remove_type() {
        let ty = message_type();
        let (mut parser, queue) = parser_with(&ty);
        assert!(parser.has_type(&ty));
        parser.remove_type(&ty).unwrap();
        assert!(!parser.has_type(&ty));
        assert!(parser.remove_type(&ty).is_err());
        assert!(parser.feed(start("message", &[("to", "a")])).is_err());
        parser.feed(Event::End).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_discards_partial_element() {
        let ty = message_type();
        let (mut parser, queue) = parser_with(&ty);
        parser
            .start_element(Tag::local("message"), Attributes::new().with("to", "a"))
            .unwrap();
        assert_eq!(parser.depth(), 1);
        parser.close();
        assert!(parser.is_idle());
        assert_eq!(parser.depth(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stray_end_is_rejected() {
        let mut parser = XsoParser::new();
        assert!(matches!(
            parser.end_element(),
            Err(StreamError::Core(ironxso_core::Error::UnbalancedEnd { .. }))
        ));
    }
}

//! Builder for configuring a top-level parser.

use crate::dispatcher::XsoParser;
use crate::error::StreamError;
use crate::handler::{FnHandler, XsoHandler};
use crate::registry::TypeRegistry;
use ironxso_core::{LanguageTag, Value};
use ironxso_schema::{Xso, XsoType};
use std::sync::Arc;

/// Builder for configuring and creating an [`XsoParser`].
pub struct XsoParserBuilder {
    registry: Option<Arc<TypeRegistry>>,
    handlers: Vec<(XsoType, Arc<dyn XsoHandler>)>,
    lang: Option<LanguageTag>,
    values: Vec<(String, Value)>,
}

impl XsoParserBuilder {
    /// Creates a builder with no registered types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            handlers: Vec::new(),
            lang: None,
            values: Vec::new(),
        }
    }

    /// Uses a shared registry instead of a fresh one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Registers a top-level type.
    #[must_use]
    pub fn handle<H: XsoHandler + 'static>(mut self, ty: &XsoType, handler: H) -> Self {
        self.handlers.push((ty.clone(), Arc::new(handler)));
        self
    }

    /// Registers a top-level type with a closure handler.
    #[must_use]
    pub fn handle_fn<F>(self, ty: &XsoType, f: F) -> Self
    where
        F: Fn(Xso) + Send + Sync + 'static,
    {
        self.handle(ty, FnHandler::new(f))
    }

    /// Sets the language inherited by top-level elements.
    #[must_use]
    pub fn lang(mut self, lang: LanguageTag) -> Self {
        self.lang = Some(lang);
        self
    }

    /// Seeds an ambient context value.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    /// Builds the parser.
    ///
    /// # Errors
    /// Returns [`StreamError::Untagged`] or [`StreamError::DuplicateTag`]
    /// if a type cannot be registered.
    pub fn build(self) -> Result<XsoParser, StreamError> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(TypeRegistry::new()));
        for (ty, handler) in self.handlers {
            registry.register(&ty, handler)?;
        }
        let mut parser = XsoParser::with_registry(registry);
        parser.set_lang(self.lang);
        for (key, value) in self.values {
            parser.context_mut().set(key, value);
        }
        Ok(parser)
    }
}

impl Default for XsoParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

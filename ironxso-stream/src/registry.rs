//! Registered top-level types.

use crate::error::StreamError;
use crate::handler::XsoHandler;
use ironxso_core::Tag;
use ironxso_schema::XsoType;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A top-level type and the handler receiving its instances.
#[derive(Clone)]
pub struct Registration {
    /// The registered type.
    pub ty: XsoType,
    /// Receiver of parsed instances.
    pub handler: Arc<dyn XsoHandler>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Maps top-level tags to registered types.
///
/// The registry is shared between a parser and anyone holding a clone of
/// its `Arc`, so handlers may register or remove types while the stream is
/// being parsed. Changes apply from the next top-level element on.
pub struct TypeRegistry {
    entries: RwLock<HashMap<Tag, Registration>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a type under its root tag.
    ///
    /// # Errors
    /// Returns [`StreamError::Untagged`] for tagless types and
    /// [`StreamError::DuplicateTag`] if the tag is taken.
    pub fn register(&self, ty: &XsoType, handler: Arc<dyn XsoHandler>) -> Result<(), StreamError> {
        let tag = ty.tag().ok_or_else(|| StreamError::Untagged {
            type_name: ty.name().to_string(),
        })?;
        let mut entries = self.entries.write();
        if entries.contains_key(tag) {
            return Err(StreamError::DuplicateTag { tag: tag.clone() });
        }
        tracing::debug!("registered top-level type '{}' for {}", ty.name(), tag);
        entries.insert(
            tag.clone(),
            Registration {
                ty: ty.clone(),
                handler,
            },
        );
        Ok(())
    }

    /// Removes the registration of a type.
    ///
    /// # Errors
    /// Returns [`StreamError::NotRegistered`] if the type's tag is not
    /// registered to this type.
    pub fn unregister(&self, ty: &XsoType) -> Result<Registration, StreamError> {
        let tag = ty.tag().ok_or_else(|| StreamError::Untagged {
            type_name: ty.name().to_string(),
        })?;
        let mut entries = self.entries.write();
        match entries.get(tag) {
            Some(registration) if registration.ty == *ty => {}
            _ => return Err(StreamError::NotRegistered { tag: tag.clone() }),
        }
        entries
            .remove(tag)
            .ok_or_else(|| StreamError::NotRegistered { tag: tag.clone() })
    }

    /// Looks up the registration for a top-level tag.
    #[must_use]
    pub fn lookup(&self, tag: &Tag) -> Option<Registration> {
        self.entries.read().get(tag).cloned()
    }

    /// Returns true if this exact type is registered.
    #[must_use]
    pub fn contains(&self, ty: &XsoType) -> bool {
        ty.tag()
            .and_then(|tag| self.entries.read().get(tag).map(|r| r.ty == *ty))
            .unwrap_or(false)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns all registered tags.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.entries.read().keys().cloned().collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::QueueHandler;
    use ironxso_schema::XsoTypeBuilder;

    fn queue() -> Arc<dyn XsoHandler> {
        Arc::new(QueueHandler::new())
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        let ty = XsoTypeBuilder::new("Msg").tag(("jabber:client", "message")).build().unwrap();
        registry.register(&ty, queue()).unwrap();

        assert_eq!(registry.count(), 1);
        assert!(registry.contains(&ty));
        let found = registry
            .lookup(&Tag::qualified("jabber:client", "message"))
            .unwrap();
        assert_eq!(found.ty, ty);
        assert!(registry.lookup(&Tag::local("message")).is_none());
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let registry = TypeRegistry::new();
        let a = XsoTypeBuilder::new("A").tag("x").build().unwrap();
        let b = XsoTypeBuilder::new("B").tag("x").build().unwrap();
        registry.register(&a, queue()).unwrap();
        assert!(matches!(
            registry.register(&b, queue()),
            Err(StreamError::DuplicateTag { .. })
        ));
        assert!(!registry.contains(&b));
    }

    #[test]
    fn test_untagged_rejected() {
        let registry = TypeRegistry::new();
        let mixin = XsoTypeBuilder::new("Mixin").build().unwrap();
        assert!(matches!(
            registry.register(&mixin, queue()),
            Err(StreamError::Untagged { .. })
        ));
    }

    #[test]
    fn test_unregister_requires_same_type() {
        let registry = TypeRegistry::new();
        let a = XsoTypeBuilder::new("A").tag("x").build().unwrap();
        let b = XsoTypeBuilder::new("B").tag("x").build().unwrap();
        registry.register(&a, queue()).unwrap();
        assert!(matches!(
            registry.unregister(&b),
            Err(StreamError::NotRegistered { .. })
        ));
        assert!(registry.unregister(&a).is_ok());
        assert_eq!(registry.count(), 0);
    }
}

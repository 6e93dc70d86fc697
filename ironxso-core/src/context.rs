//! Ambient per-parse state.

use crate::lang::LanguageTag;
use crate::value::Value;
use std::collections::HashMap;

/// State propagated from an element to its descendants during parsing.
///
/// A nested scope is entered with [`Context::enter`], which yields an
/// independent copy. Changes made inside the scope are never visible to the
/// parent; leaving the scope is dropping the copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// The language inherited by `xml:lang`-aware fields.
    pub lang: Option<LanguageTag>,
    values: HashMap<String, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the given language.
    #[must_use]
    pub fn with_lang(lang: Option<LanguageTag>) -> Self {
        Self {
            lang,
            values: HashMap::new(),
        }
    }

    /// Enters a nested scope seeded from this one.
    #[must_use]
    pub fn enter(&self) -> Self {
        self.clone()
    }

    /// Reads an ambient value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets an ambient value in this scope.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes an ambient value from this scope.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_scope_does_not_write_back() {
        let mut parent = Context::new();
        parent.lang = Some(LanguageTag::parse("de").unwrap());
        parent.set("depth", 1);

        {
            let mut child = parent.enter();
            assert_eq!(child.lang, parent.lang);
            assert_eq!(child.get("depth"), Some(&Value::Int(1)));
            child.lang = Some(LanguageTag::parse("en").unwrap());
            child.set("depth", 2);
        }

        assert_eq!(parent.lang, Some(LanguageTag::parse("de").unwrap()));
        assert_eq!(parent.get("depth"), Some(&Value::Int(1)));
    }
}

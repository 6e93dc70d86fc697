//! Qualified names for XML elements and attributes.

use crate::error::{Error, Result};
use std::fmt;

/// Namespace URIs with fixed meaning.
pub mod namespaces {
    /// The namespace bound to the `xml` prefix.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// The namespace bound to the `xmlns` prefix.
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// A `(namespace, local-name)` pair addressing one element or attribute.
///
/// Tags order by namespace first (absent namespaces sort first) and then by
/// local name, which gives maps keyed by tags a stable iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    namespace: Option<String>,
    local: String,
}

impl Tag {
    /// Creates a tag from an optional namespace and a local name.
    #[must_use]
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.into(),
        }
    }

    /// Creates a namespaced tag.
    #[must_use]
    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Creates a tag without namespace.
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// The `xml:lang` attribute tag.
    #[must_use]
    pub fn xml_lang() -> Self {
        Self::qualified(namespaces::XML, "lang")
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Returns true if the local name is a plausible XML name.
    ///
    /// This rejects empty names, whitespace, and the characters that would
    /// make the Clark notation ambiguous; it is not a full NCName check.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let local_ok = !self.local.is_empty()
            && !self
                .local
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ':' | '{' | '}' | '<' | '>' | '&'));
        let ns_ok = self
            .namespace
            .as_deref()
            .is_none_or(|ns| !ns.is_empty() && !ns.contains(['{', '}']));
        local_ok && ns_ok
    }

    /// Parses Clark notation: `{namespace}local` or a bare `local`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedTag`] if the braces are unbalanced or the
    /// resulting tag is not well formed.
    pub fn parse_clark(text: &str) -> Result<Self> {
        let tag = match text.strip_prefix('{') {
            Some(rest) => {
                let (ns, local) = rest.split_once('}').ok_or_else(|| Error::MalformedTag {
                    value: text.to_string(),
                })?;
                Self::qualified(ns, local)
            }
            None => Self::local(text),
        };
        if tag.is_well_formed() {
            Ok(tag)
        } else {
            Err(Error::MalformedTag {
                value: text.to_string(),
            })
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

impl From<&str> for Tag {
    fn from(local: &str) -> Self {
        Self::local(local)
    }
}

impl From<(&str, &str)> for Tag {
    fn from((namespace, local): (&str, &str)) -> Self {
        Self::qualified(namespace, local)
    }
}

impl From<(Option<&str>, &str)> for Tag {
    fn from((namespace, local): (Option<&str>, &str)) -> Self {
        Self::new(namespace, local)
    }
}

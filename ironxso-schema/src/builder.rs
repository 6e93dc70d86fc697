//! Builder for element types.

use crate::error::{DefinitionError, ValueError};
use crate::field::Field;
use crate::handler::ErrorHandler;
use crate::schema::{Hooks, NamespaceMap, Policies, Policy, Tables, TypeInner, XsoType};
use crate::xso::Xso;
use ironxso_core::{Context, Tag};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

enum TagSpec {
    Tag(Tag),
    Clark(String),
}

/// Builder for configuring and creating an [`XsoType`].
pub struct XsoTypeBuilder {
    name: String,
    tag: Option<TagSpec>,
    bases: Vec<XsoType>,
    fields: Vec<Field>,
    policies: Policies,
    declare_ns: Option<NamespaceMap>,
    hooks: Hooks,
    capturing: bool,
}

impl XsoTypeBuilder {
    /// Creates a builder for a type without tag, bases or fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            bases: Vec::new(),
            fields: Vec::new(),
            policies: Policies::default(),
            declare_ns: None,
            hooks: Hooks::default(),
            capturing: false,
        }
    }

    /// Sets the root tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(TagSpec::Tag(tag.into()));
        self
    }

    /// Sets the root tag from Clark notation (`{namespace}local` or `local`).
    #[must_use]
    pub fn tag_clark(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(TagSpec::Clark(tag.into()));
        self
    }

    /// Adds a base type.
    #[must_use]
    pub fn base(mut self, base: &XsoType) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Adds several base types, in order.
    #[must_use]
    pub fn bases(mut self, bases: &[&XsoType]) -> Self {
        self.bases.extend(bases.iter().map(|b| (*b).clone()));
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds several fields, in order.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Sets all unknown-content policies.
    #[must_use]
    pub fn policies(mut self, policies: Policies) -> Self {
        self.policies = policies;
        self
    }

    /// Sets the unknown-child policy (default: drop).
    #[must_use]
    pub fn unknown_child_policy(mut self, policy: Policy) -> Self {
        self.policies.unknown_child = policy;
        self
    }

    /// Sets the unknown-attribute policy (default: drop).
    #[must_use]
    pub fn unknown_attr_policy(mut self, policy: Policy) -> Self {
        self.policies.unknown_attr = policy;
        self
    }

    /// Sets the unknown-text policy (default: fail).
    #[must_use]
    pub fn unknown_text_policy(mut self, policy: Policy) -> Self {
        self.policies.unknown_text = policy;
        self
    }

    /// Declares a namespace prefix (`None` for the default namespace) on the
    /// root element. Any explicit declaration replaces the derived one.
    #[must_use]
    pub fn declare_ns(mut self, prefix: Option<&str>, namespace: impl Into<String>) -> Self {
        self.declare_ns
            .get_or_insert_with(NamespaceMap::new)
            .insert(prefix.map(str::to_string), namespace.into());
        self
    }

    /// Declares no namespaces at all on the root element.
    #[must_use]
    pub fn no_declare_ns(mut self) -> Self {
        self.declare_ns = Some(NamespaceMap::new());
        self
    }

    /// Sets the error handler.
    #[must_use]
    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.hooks.error_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the whole-instance validation routine.
    #[must_use]
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Xso) -> Result<(), ValueError> + Send + Sync + 'static,
    {
        self.hooks.validate = Some(Arc::new(f));
        self
    }

    /// Sets the post-construction routine.
    #[must_use]
    pub fn after_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Xso, &Context) -> Result<(), ValueError> + Send + Sync + 'static,
    {
        self.hooks.after_load = Some(Arc::new(f));
        self
    }

    /// Makes parsed instances keep their exact raw event sequence.
    #[must_use]
    pub fn capturing(mut self) -> Self {
        self.capturing = true;
        self
    }

    /// Validates the definition and builds the type.
    ///
    /// # Errors
    /// Returns [`DefinitionError`] for a malformed tag, duplicate own field
    /// names, ambiguous tag claims or more than one text or collector field.
    pub fn build(self) -> Result<XsoType, DefinitionError> {
        let tag = match self.tag {
            None => None,
            Some(TagSpec::Tag(tag)) => Some(tag),
            Some(TagSpec::Clark(text)) => Some(Tag::parse_clark(&text).map_err(|_| {
                DefinitionError::MalformedTag {
                    value: text.clone(),
                }
            })?),
        };
        if let Some(tag) = &tag
            && !tag.is_well_formed()
        {
            return Err(DefinitionError::MalformedTag {
                value: tag.to_string(),
            });
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(DefinitionError::DuplicateField {
                    name: field.name().to_string(),
                    type_name: self.name.clone(),
                });
            }
        }

        let (declare_ns, declare_ns_explicit) = match self.declare_ns {
            Some(map) => (Some(map), true),
            None => match inherited_declare_ns(&self.bases) {
                Some(map) => (Some(map), true),
                None => (tag.as_ref().map(derived_declare_ns), false),
            },
        };

        let tables = Tables::merge(&self.name, &self.bases, self.fields)?;
        tracing::debug!(
            "defined type '{}' with {} fields",
            self.name,
            tables.fields.len()
        );

        Ok(XsoType::from_inner(TypeInner {
            id: TypeInner::next_id(),
            name: self.name,
            tag,
            declare_ns,
            declare_ns_explicit,
            policies: self.policies,
            hooks: self.hooks,
            capturing: self.capturing,
            bases: self.bases,
            tables: RwLock::new(tables),
            dependents: AtomicUsize::new(0),
        }))
    }
}

fn derived_declare_ns(tag: &Tag) -> NamespaceMap {
    let mut map = NamespaceMap::new();
    if let Some(ns) = tag.namespace() {
        map.insert(None, ns.to_string());
    }
    map
}

fn inherited_declare_ns(bases: &[XsoType]) -> Option<NamespaceMap> {
    bases
        .iter()
        .find(|b| b.0.declare_ns_explicit)
        .and_then(|b| b.declare_ns().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_ns_defaults() {
        let plain = XsoTypeBuilder::new("A").tag("foo").build().unwrap();
        assert_eq!(plain.declare_ns(), Some(&NamespaceMap::new()));

        let namespaced = XsoTypeBuilder::new("B")
            .tag(("uri:foo", "foo"))
            .build()
            .unwrap();
        let mut expected = NamespaceMap::new();
        expected.insert(None, "uri:foo".to_string());
        assert_eq!(namespaced.declare_ns(), Some(&expected));

        let tagless = XsoTypeBuilder::new("C").build().unwrap();
        assert_eq!(tagless.declare_ns(), None);
    }

    #[test]
    fn test_user_declare_ns_is_inherited() {
        let base = XsoTypeBuilder::new("A").no_declare_ns().build().unwrap();
        let derived = XsoTypeBuilder::new("B")
            .base(&base)
            .tag(("uri:foo", "foo"))
            .build()
            .unwrap();
        assert_eq!(derived.declare_ns(), Some(&NamespaceMap::new()));
    }

    #[test]
    fn test_derived_declare_ns_is_not_inherited() {
        let base = XsoTypeBuilder::new("A")
            .tag(("uri:a", "a"))
            .build()
            .unwrap();
        let derived = XsoTypeBuilder::new("B")
            .base(&base)
            .tag(("uri:b", "b"))
            .build()
            .unwrap();
        assert_eq!(
            derived.declare_ns().and_then(|m| m.get(&None)),
            Some(&"uri:b".to_string())
        );
    }

    #[test]
    fn test_malformed_tags_are_rejected() {
        assert!(matches!(
            XsoTypeBuilder::new("A").tag_clark("{uri:a").build(),
            Err(DefinitionError::MalformedTag { .. })
        ));
        assert!(matches!(
            XsoTypeBuilder::new("A").tag("").build(),
            Err(DefinitionError::MalformedTag { .. })
        ));
        let ok = XsoTypeBuilder::new("A").tag_clark("{uri:a}a").build().unwrap();
        assert_eq!(ok.tag(), Some(&Tag::qualified("uri:a", "a")));
    }

    #[test]
    fn test_duplicate_own_field_names() {
        let err = XsoTypeBuilder::new("A")
            .field(Field::attr("x", "a").build())
            .field(Field::attr("x", "b").build())
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateField { .. }));
    }

    #[test]
    fn test_policy_defaults() {
        let ty = XsoTypeBuilder::new("A").build().unwrap();
        assert_eq!(ty.policies().unknown_child, Policy::Drop);
        assert_eq!(ty.policies().unknown_attr, Policy::Drop);
        assert_eq!(ty.policies().unknown_text, Policy::Fail);
    }
}

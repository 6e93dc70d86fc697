//! The schema registry: per-type merged field tables.
//!
//! An [`XsoType`] is built once by [`crate::XsoTypeBuilder`]. Building merges
//! the type's own fields with the already merged tables of its bases,
//! rejecting two distinct fields that claim one tag while deduplicating a
//! field inherited along several paths. Once another type has been built on
//! top of a type, the type is frozen.

use crate::error::{DefinitionError, ValueError};
use crate::field::{Field, FieldId, FieldKind};
use crate::handler::ErrorHandler;
use crate::xso::Xso;
use ironxso_core::{Context, Tag};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Handling of content that no field matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Reject the content; the error is offered to the error handler.
    Fail,
    /// Discard the content silently.
    Drop,
}

/// Unknown-content policies of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    /// Child elements without a matching field.
    pub unknown_child: Policy,
    /// Attributes without a matching field.
    pub unknown_attr: Policy,
    /// Text when there is no text field.
    pub unknown_text: Policy,
}

impl Policies {
    /// Fail on all unknown content. Used for leaf child fields.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            unknown_child: Policy::Fail,
            unknown_attr: Policy::Fail,
            unknown_text: Policy::Fail,
        }
    }
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            unknown_child: Policy::Drop,
            unknown_attr: Policy::Drop,
            unknown_text: Policy::Fail,
        }
    }
}

/// Whole-instance validation routine.
pub type ValidateHook = Arc<dyn Fn(&Xso) -> Result<(), ValueError> + Send + Sync>;

/// Post-construction routine run after a successful parse.
pub type AfterLoadHook = Arc<dyn Fn(&mut Xso, &Context) -> Result<(), ValueError> + Send + Sync>;

/// Namespace declarations emitted on an element: prefix (or `None` for the
/// default namespace) to URI.
pub type NamespaceMap = BTreeMap<Option<String>, String>;

#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) error_handler: Option<Arc<dyn ErrorHandler>>,
    pub(crate) validate: Option<ValidateHook>,
    pub(crate) after_load: Option<AfterLoadHook>,
}

/// Merged lookup tables of one type.
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) own: Vec<Field>,
    pub(crate) fields: Vec<Field>,
    pub(crate) by_name: HashMap<String, Field>,
    pub(crate) attrs: HashMap<Tag, Field>,
    pub(crate) attr_fields: Vec<Field>,
    pub(crate) children: HashMap<Tag, Field>,
    pub(crate) child_fields: Vec<Field>,
    pub(crate) text: Option<Field>,
    pub(crate) collector: Option<Field>,
}

impl Tables {
    /// Merges base tables with own fields. Bases contribute first, in
    /// declaration order.
    pub(crate) fn merge(
        type_name: &str,
        bases: &[XsoType],
        own: Vec<Field>,
    ) -> Result<Self, DefinitionError> {
        let mut tables = Self {
            own: own.clone(),
            ..Self::default()
        };
        let mut seen = HashSet::new();
        for base in bases {
            let inherited = base.tables().fields.clone();
            for field in inherited {
                tables.add(type_name, field, &mut seen)?;
            }
        }
        for field in own {
            tables.add(type_name, field, &mut seen)?;
        }
        Ok(tables)
    }

    fn add(
        &mut self,
        type_name: &str,
        field: Field,
        seen: &mut HashSet<FieldId>,
    ) -> Result<(), DefinitionError> {
        if !seen.insert(field.id()) {
            return Ok(());
        }
        match field.kind() {
            FieldKind::Attr { tag, .. } => {
                if self.attrs.contains_key(tag) {
                    return Err(DefinitionError::AmbiguousTag {
                        kind: "attribute",
                        tag: tag.clone(),
                        type_name: type_name.to_string(),
                    });
                }
                self.attrs.insert(tag.clone(), field.clone());
                self.attr_fields.push(field.clone());
            }
            FieldKind::Text { .. } => {
                if self.text.is_some() {
                    return Err(DefinitionError::MultipleText {
                        type_name: type_name.to_string(),
                    });
                }
                self.text = Some(field.clone());
            }
            FieldKind::Collector => {
                if self.collector.is_some() {
                    return Err(DefinitionError::MultipleCollector {
                        type_name: type_name.to_string(),
                    });
                }
                self.collector = Some(field.clone());
            }
            _ => {
                for tag in field.child_tags()? {
                    self.claim_child(type_name, tag, &field)?;
                }
                self.child_fields.push(field.clone());
            }
        }
        self.by_name.insert(field.name().to_string(), field.clone());
        self.fields.push(field);
        Ok(())
    }

    fn claim_child(
        &mut self,
        type_name: &str,
        tag: Tag,
        field: &Field,
    ) -> Result<(), DefinitionError> {
        if self.children.contains_key(&tag) {
            return Err(DefinitionError::AmbiguousTag {
                kind: "child",
                tag,
                type_name: type_name.to_string(),
            });
        }
        self.children.insert(tag, field.clone());
        Ok(())
    }
}

pub(crate) struct TypeInner {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) tag: Option<Tag>,
    pub(crate) declare_ns: Option<NamespaceMap>,
    pub(crate) declare_ns_explicit: bool,
    pub(crate) policies: Policies,
    pub(crate) hooks: Hooks,
    pub(crate) capturing: bool,
    pub(crate) bases: Vec<XsoType>,
    pub(crate) tables: RwLock<Tables>,
    pub(crate) dependents: AtomicUsize,
}

impl TypeInner {
    pub(crate) fn next_id() -> u64 {
        NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed)
    }
}

impl Drop for TypeInner {
    fn drop(&mut self) {
        for base in &self.bases {
            base.0.dependents.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// A registered element type. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct XsoType(pub(crate) Arc<TypeInner>);

impl XsoType {
    pub(crate) fn from_inner(inner: TypeInner) -> Self {
        for base in &inner.bases {
            base.0.dependents.fetch_add(1, Ordering::AcqRel);
        }
        Self(Arc::new(inner))
    }

    pub(crate) fn tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.0.tables.read()
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.0.hooks
    }

    /// Process-unique type id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// The type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The root tag, if the type has one.
    #[must_use]
    pub fn tag(&self) -> Option<&Tag> {
        self.0.tag.as_ref()
    }

    /// Namespace declarations emitted on the root element.
    #[must_use]
    pub fn declare_ns(&self) -> Option<&NamespaceMap> {
        self.0.declare_ns.as_ref()
    }

    /// Unknown-content policies.
    #[must_use]
    pub fn policies(&self) -> Policies {
        self.0.policies
    }

    /// Returns true if parsed instances keep their raw events.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.0.capturing
    }

    /// Direct base types.
    #[must_use]
    pub fn bases(&self) -> &[XsoType] {
        &self.0.bases
    }

    /// Returns true if other types have been built on this one.
    #[must_use]
    pub fn has_dependents(&self) -> bool {
        self.0.dependents.load(Ordering::Acquire) > 0
    }

    /// Returns true if this type is `other` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &XsoType) -> bool {
        self == other || self.0.bases.iter().any(|b| b.is_subtype_of(other))
    }

    /// Looks up a field by name. Own fields shadow inherited ones.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Field> {
        self.tables().by_name.get(name).cloned()
    }

    /// All fields, inherited first.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.tables().fields.clone()
    }

    /// Fields declared on this type itself.
    #[must_use]
    pub fn own_fields(&self) -> Vec<Field> {
        self.tables().own.clone()
    }

    /// Attribute fields.
    #[must_use]
    pub fn attr_fields(&self) -> Vec<Field> {
        self.tables().attr_fields.clone()
    }

    /// Child fields in output order.
    #[must_use]
    pub fn child_fields(&self) -> Vec<Field> {
        self.tables().child_fields.clone()
    }

    /// The field bound to an attribute tag.
    #[must_use]
    pub fn attr_field(&self, tag: &Tag) -> Option<Field> {
        self.tables().attrs.get(tag).cloned()
    }

    /// The field bound to a child element tag.
    #[must_use]
    pub fn child_field(&self, tag: &Tag) -> Option<Field> {
        self.tables().children.get(tag).cloned()
    }

    /// The text field, if any.
    #[must_use]
    pub fn text_field(&self) -> Option<Field> {
        self.tables().text.clone()
    }

    /// The collector field, if any.
    #[must_use]
    pub fn collector_field(&self) -> Option<Field> {
        self.tables().collector.clone()
    }

    /// The field bound to `xml:lang`, if any.
    #[must_use]
    pub fn lang_field(&self) -> Option<Field> {
        self.attr_field(&Tag::xml_lang())
    }

    /// Returns true if the field belongs to this type's merged tables.
    #[must_use]
    pub fn has_field(&self, field: &Field) -> bool {
        self.tables().fields.contains(field)
    }

    fn ensure_mutable(&self) -> Result<(), DefinitionError> {
        if self.has_dependents() {
            return Err(DefinitionError::HasDependents {
                type_name: self.0.name.clone(),
            });
        }
        Ok(())
    }

    /// Adds a field after definition.
    ///
    /// # Errors
    /// Returns [`DefinitionError::HasDependents`] if the type is frozen,
    /// [`DefinitionError::DuplicateField`] if an own field has the same
    /// name, or any merge error.
    pub fn add_field(&self, field: Field) -> Result<(), DefinitionError> {
        self.ensure_mutable()?;
        let mut tables = self.0.tables.write();
        if tables.own.iter().any(|f| f.name() == field.name()) {
            return Err(DefinitionError::DuplicateField {
                name: field.name().to_string(),
                type_name: self.0.name.clone(),
            });
        }
        let mut own = tables.own.clone();
        own.push(field);
        *tables = Tables::merge(&self.0.name, &self.0.bases, own)?;
        tracing::debug!("added field to type '{}'", self.0.name);
        Ok(())
    }

    /// Removes an own field after definition.
    ///
    /// # Errors
    /// Returns [`DefinitionError::HasDependents`] if the type is frozen or
    /// [`DefinitionError::UnknownField`] if the field is not an own field.
    pub fn remove_field(&self, field: &Field) -> Result<(), DefinitionError> {
        self.ensure_mutable()?;
        let mut tables = self.0.tables.write();
        if !tables.own.contains(field) {
            return Err(DefinitionError::UnknownField {
                name: field.name().to_string(),
                type_name: self.0.name.clone(),
            });
        }
        let own: Vec<Field> = tables.own.iter().filter(|f| *f != field).cloned().collect();
        *tables = Tables::merge(&self.0.name, &self.0.bases, own)?;
        tracing::debug!("removed field '{}' from type '{}'", field.name(), self.0.name);
        Ok(())
    }

    /// Registers one more candidate type on a child-dispatching field.
    ///
    /// # Errors
    /// Returns [`DefinitionError::HasDependents`] if the type is frozen,
    /// [`DefinitionError::UnknownField`] or [`DefinitionError::NotChildField`]
    /// for an unsuitable field, [`DefinitionError::Untagged`] if `candidate`
    /// has no tag, or [`DefinitionError::AmbiguousTag`] if its tag is taken.
    pub fn register_child(&self, field: &Field, candidate: &XsoType) -> Result<(), DefinitionError> {
        self.ensure_mutable()?;
        let mut tables = self.0.tables.write();
        if !tables.fields.contains(field) {
            return Err(DefinitionError::UnknownField {
                name: field.name().to_string(),
                type_name: self.0.name.clone(),
            });
        }
        let candidates = field.candidates().ok_or_else(|| DefinitionError::NotChildField {
            name: field.name().to_string(),
        })?;
        let tag = candidate
            .tag()
            .cloned()
            .ok_or_else(|| DefinitionError::Untagged {
                type_name: candidate.name().to_string(),
            })?;
        tables.claim_child(&self.0.name, tag, field)?;
        candidates.register(candidate.clone());
        tracing::debug!(
            "registered '{}' on field '{}' of type '{}'",
            candidate.name(),
            field.name(),
            self.0.name
        );
        Ok(())
    }
}

impl PartialEq for XsoType {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for XsoType {}

impl Hash for XsoType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for XsoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XsoType")
            .field("name", &self.0.name)
            .field("tag", &self.0.tag)
            .finish_non_exhaustive()
    }
}

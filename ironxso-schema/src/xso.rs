//! Instances of element types.
//!
//! An [`Xso`] stores its field values keyed by field identity. Reading a
//! scalar field distinguishes four states: present, defaulted, unset (no
//! value and no default) and incomplete (a parse error for the field was
//! suppressed).

use crate::error::AccessError;
use crate::field::{Field, FieldId, FieldKind};
use crate::list::XsoList;
use crate::schema::XsoType;
use crate::types::{BoolType, ValueType};
use ironxso_core::{Event, LanguageTag, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

static EMPTY_LIST: XsoList = XsoList::new();
static EMPTY_MAP: BTreeMap<Value, XsoList> = BTreeMap::new();
static EMPTY_VALUES: Vec<Value> = Vec::new();
static EMPTY_VALUE_MAP: BTreeMap<Value, Value> = BTreeMap::new();
static EMPTY_MULTI_MAP: BTreeMap<Value, Vec<Value>> = BTreeMap::new();

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Content {
    Value(Value),
    Child(Option<Box<Xso>>),
    List(XsoList),
    Map(BTreeMap<Value, XsoList>),
    Subtrees(Vec<Vec<Event>>),
    Values(Vec<Value>),
    ValueMap(BTreeMap<Value, Value>),
    MultiMap(BTreeMap<Value, Vec<Value>>),
}

impl Content {
    fn is_empty(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Child(c) => c.is_none(),
            Self::List(l) => l.is_empty(),
            Self::Map(m) => m.values().all(|l| l.is_empty()),
            Self::Subtrees(s) => s.is_empty(),
            Self::Values(v) => v.is_empty(),
            Self::ValueMap(m) => m.is_empty(),
            Self::MultiMap(m) => m.values().all(Vec::is_empty),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    Set(Content),
    Incomplete,
}

/// An instance of an [`XsoType`].
#[derive(Clone)]
pub struct Xso {
    ty: XsoType,
    slots: HashMap<FieldId, Slot>,
    captured: Option<Vec<Event>>,
}

macro_rules! collection_access {
    ($get:ident, $get_mut:ident, $variant:ident, $kind:pat, $ty:ty, $empty:ident, $new:expr) => {
        /// Reads the collection stored in a field. Unused fields read as
        /// empty.
        ///
        /// # Errors
        /// Returns [`AccessError`] if the field is foreign or of another kind.
        pub fn $get(&self, field: &Field) -> Result<&$ty, AccessError> {
            self.check(field)?;
            if !matches!(field.kind(), $kind) {
                return Err(wrong_kind(field));
            }
            match self.slots.get(&field.id()) {
                Some(Slot::Set(Content::$variant(c))) => Ok(c),
                _ => Ok(&$empty),
            }
        }

        /// Mutable access to the collection stored in a field.
        ///
        /// # Errors
        /// Returns [`AccessError`] if the field is foreign or of another kind.
        pub fn $get_mut(&mut self, field: &Field) -> Result<&mut $ty, AccessError> {
            self.check(field)?;
            if !matches!(field.kind(), $kind) {
                return Err(wrong_kind(field));
            }
            let slot = self
                .slots
                .entry(field.id())
                .or_insert_with(|| Slot::Set(Content::$variant($new)));
            if !matches!(slot, Slot::Set(Content::$variant(_))) {
                *slot = Slot::Set(Content::$variant($new));
            }
            match slot {
                Slot::Set(Content::$variant(c)) => Ok(c),
                _ => Err(wrong_kind(field)),
            }
        }
    };
}

fn wrong_kind(field: &Field) -> AccessError {
    AccessError::WrongKind {
        field: field.name().to_string(),
        kind: field.kind().name(),
    }
}

impl Xso {
    /// Creates an empty instance. Every field reads as its default or unset.
    #[must_use]
    pub fn new(ty: &XsoType) -> Self {
        Self {
            ty: ty.clone(),
            slots: HashMap::new(),
            captured: None,
        }
    }

    /// The instance's type.
    #[must_use]
    pub fn xso_type(&self) -> &XsoType {
        &self.ty
    }

    fn check(&self, field: &Field) -> Result<(), AccessError> {
        if self.ty.has_field(field) {
            Ok(())
        } else {
            Err(AccessError::UnknownField {
                field: field.name().to_string(),
                type_name: self.ty.name().to_string(),
            })
        }
    }

    /// Looks up a field of this instance's type by name.
    ///
    /// # Errors
    /// Returns [`AccessError::UnknownField`] if there is no such field.
    pub fn field(&self, name: &str) -> Result<Field, AccessError> {
        self.ty.field(name).ok_or_else(|| AccessError::UnknownField {
            field: name.to_string(),
            type_name: self.ty.name().to_string(),
        })
    }

    /// Reads a scalar field.
    ///
    /// # Errors
    /// Returns [`AccessError::Unset`] if there is neither a value nor a
    /// default, [`AccessError::Incomplete`] if a parse error for the field
    /// was suppressed, or a kind/field mismatch error.
    pub fn get(&self, field: &Field) -> Result<Value, AccessError> {
        self.check(field)?;
        if !field.is_scalar() {
            return Err(wrong_kind(field));
        }
        match self.slots.get(&field.id()) {
            Some(Slot::Incomplete) => Err(AccessError::Incomplete {
                field: field.name().to_string(),
            }),
            Some(Slot::Set(Content::Value(v))) => Ok(v.clone()),
            _ => field.default_value().ok_or_else(|| AccessError::Unset {
                field: field.name().to_string(),
            }),
        }
    }

    /// Reads a scalar field by name.
    ///
    /// # Errors
    /// See [`Xso::get`].
    pub fn get_by_name(&self, name: &str) -> Result<Value, AccessError> {
        let field = self.field(name)?;
        self.get(&field)
    }

    /// Assigns a scalar field from program code.
    ///
    /// The value is coerced and, depending on the field's validate mode,
    /// validated. A successful write clears an incomplete state.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the value is rejected.
    pub fn set(&mut self, field: &Field, value: impl Into<Value>) -> Result<(), AccessError> {
        self.check(field)?;
        let value = value.into();
        let value = match field.kind() {
            FieldKind::Attr { scalar, .. }
            | FieldKind::Text { scalar }
            | FieldKind::ChildText { scalar, .. } => scalar.coerce_code(field.name(), value)?,
            FieldKind::ChildFlag { .. } => {
                BoolType
                    .coerce(value)
                    .map_err(|e| AccessError::InvalidValue {
                        field: field.name().to_string(),
                        reason: e.message,
                    })?
            }
            FieldKind::ChildTag { choices, .. } => {
                let allowed = if value.is_none() {
                    choices.allow_none()
                } else {
                    choices.tag_for(&value).is_some()
                };
                if !allowed {
                    return Err(AccessError::InvalidValue {
                        field: field.name().to_string(),
                        reason: format!("{} is not a candidate", value),
                    });
                }
                value
            }
            _ => return Err(wrong_kind(field)),
        };
        self.slots
            .insert(field.id(), Slot::Set(Content::Value(value)));
        Ok(())
    }

    /// Assigns a scalar field by name.
    ///
    /// # Errors
    /// See [`Xso::set`].
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let field = self.field(name)?;
        self.set(&field, value)
    }

    /// Reverts a field to its default (or unset) state, or empties a
    /// collection.
    ///
    /// # Errors
    /// Returns [`AccessError::Required`] for a required child field and
    /// [`AccessError::WrongKind`] for a collector field.
    pub fn delete(&mut self, field: &Field) -> Result<(), AccessError> {
        self.check(field)?;
        match field.kind() {
            FieldKind::Child { required: true, .. } => {
                return Err(AccessError::Required {
                    field: field.name().to_string(),
                });
            }
            FieldKind::Collector => return Err(wrong_kind(field)),
            _ => {}
        }
        self.slots.remove(&field.id());
        Ok(())
    }

    /// Returns true if a value was stored for the field.
    #[must_use]
    pub fn is_set(&self, field: &Field) -> bool {
        matches!(self.slots.get(&field.id()), Some(Slot::Set(_)))
    }

    /// Returns true if a parse error for the field was suppressed.
    #[must_use]
    pub fn is_incomplete(&self, field: &Field) -> bool {
        matches!(self.slots.get(&field.id()), Some(Slot::Incomplete))
    }

    pub(crate) fn mark_incomplete(&mut self, field: &Field) {
        self.slots.insert(field.id(), Slot::Incomplete);
    }

    /// Stores an already validated value received from the stream.
    pub(crate) fn store(&mut self, field: &Field, value: Value) {
        self.slots
            .insert(field.id(), Slot::Set(Content::Value(value)));
    }

    pub(crate) fn unstore(&mut self, field: &Field) {
        self.slots.remove(&field.id());
    }

    /// Reads a single-child field.
    ///
    /// # Errors
    /// Returns [`AccessError::MissingMember`] if a required child is absent,
    /// or a kind/field mismatch error.
    pub fn child(&self, field: &Field) -> Result<Option<&Xso>, AccessError> {
        self.check(field)?;
        let FieldKind::Child { required, .. } = field.kind() else {
            return Err(wrong_kind(field));
        };
        match self.slots.get(&field.id()) {
            Some(Slot::Set(Content::Child(Some(child)))) => Ok(Some(&**child)),
            _ if *required => Err(AccessError::MissingMember {
                field: field.name().to_string(),
            }),
            _ => Ok(None),
        }
    }

    /// Mutable access to a single-child field.
    ///
    /// # Errors
    /// See [`Xso::child`].
    pub fn child_mut(&mut self, field: &Field) -> Result<Option<&mut Xso>, AccessError> {
        self.check(field)?;
        let FieldKind::Child { required, .. } = field.kind() else {
            return Err(wrong_kind(field));
        };
        match self.slots.get_mut(&field.id()) {
            Some(Slot::Set(Content::Child(Some(child)))) => Ok(Some(&mut **child)),
            _ if *required => Err(AccessError::MissingMember {
                field: field.name().to_string(),
            }),
            _ => Ok(None),
        }
    }

    /// Assigns a single-child field.
    ///
    /// # Errors
    /// Returns [`AccessError::Required`] when clearing a required field and
    /// [`AccessError::NotCandidate`] when a strict field is given an
    /// instance of an unregistered type.
    pub fn set_child(&mut self, field: &Field, child: Option<Xso>) -> Result<(), AccessError> {
        self.check(field)?;
        let FieldKind::Child {
            candidates,
            required,
            strict,
        } = field.kind()
        else {
            return Err(wrong_kind(field));
        };
        match &child {
            None if *required => {
                return Err(AccessError::Required {
                    field: field.name().to_string(),
                });
            }
            Some(c) if *strict && !candidates.accepts(c.xso_type()) => {
                return Err(AccessError::NotCandidate {
                    field: field.name().to_string(),
                    type_name: c.xso_type().name().to_string(),
                });
            }
            _ => {}
        }
        self.slots.insert(
            field.id(),
            Slot::Set(Content::Child(child.map(Box::new))),
        );
        Ok(())
    }

    collection_access!(
        children,
        children_mut,
        List,
        FieldKind::ChildList { .. },
        XsoList,
        EMPTY_LIST,
        XsoList::new()
    );

    collection_access!(
        child_map,
        child_map_mut,
        Map,
        FieldKind::ChildMap { .. },
        BTreeMap<Value, XsoList>,
        EMPTY_MAP,
        BTreeMap::new()
    );

    collection_access!(
        values,
        values_mut,
        Values,
        FieldKind::ChildValueList { .. },
        Vec<Value>,
        EMPTY_VALUES,
        Vec::new()
    );

    collection_access!(
        value_map,
        value_map_mut,
        ValueMap,
        FieldKind::ChildValueMap { .. },
        BTreeMap<Value, Value>,
        EMPTY_VALUE_MAP,
        BTreeMap::new()
    );

    collection_access!(
        multi_map,
        multi_map_mut,
        MultiMap,
        FieldKind::ChildValueMultiMap { .. },
        BTreeMap<Value, Vec<Value>>,
        EMPTY_MULTI_MAP,
        BTreeMap::new()
    );

    /// Reads the children stored under one key of a child map. Unused keys
    /// read as empty.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the field is foreign or of another kind.
    pub fn child_map_entry(&self, field: &Field, key: &Value) -> Result<&XsoList, AccessError> {
        Ok(self.child_map(field)?.get(key).unwrap_or(&EMPTY_LIST))
    }

    /// Subtrees captured by a collector field, in document order.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the field is foreign or not a collector.
    pub fn collected(&self, field: &Field) -> Result<&[Vec<Event>], AccessError> {
        self.check(field)?;
        if !matches!(field.kind(), FieldKind::Collector) {
            return Err(wrong_kind(field));
        }
        match self.slots.get(&field.id()) {
            Some(Slot::Set(Content::Subtrees(s))) => Ok(s),
            _ => Ok(&[]),
        }
    }

    /// Appends one subtree to a collector field.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the field is foreign or not a collector.
    pub fn push_collected(&mut self, field: &Field, subtree: Vec<Event>) -> Result<(), AccessError> {
        self.check(field)?;
        if !matches!(field.kind(), FieldKind::Collector) {
            return Err(wrong_kind(field));
        }
        let slot = self
            .slots
            .entry(field.id())
            .or_insert_with(|| Slot::Set(Content::Subtrees(Vec::new())));
        if let Slot::Set(Content::Subtrees(s)) = slot {
            s.push(subtree);
        }
        Ok(())
    }

    /// The raw events this instance was parsed from, for capturing types.
    #[must_use]
    pub fn captured_events(&self) -> Option<&[Event]> {
        self.captured.as_deref()
    }

    pub(crate) fn set_captured(&mut self, events: Vec<Event>) {
        self.captured = Some(events);
    }

    /// The instance's language: the value of its `xml:lang` field, if the
    /// type has one.
    #[must_use]
    pub fn lang(&self) -> Option<LanguageTag> {
        let field = self.ty.lang_field()?;
        self.get(&field).ok()?.as_lang().cloned()
    }

    /// Checks field contents and runs the type's validation routine,
    /// without descending into children.
    ///
    /// Attribute and text fields are only checked when `check_attrs` is
    /// set; the parser settles them before this runs.
    pub(crate) fn validate_fields(&self, check_attrs: bool) -> Result<(), AccessError> {
        for field in self.ty.fields() {
            if self.is_incomplete(&field) {
                continue;
            }
            match field.kind() {
                FieldKind::Child { required: true, .. } => {
                    self.child(&field)?;
                }
                FieldKind::ChildText { .. } | FieldKind::ChildTag { .. } => {
                    if !self.is_set(&field) && field.default_value().is_none() {
                        return Err(AccessError::MissingMember {
                            field: field.name().to_string(),
                        });
                    }
                }
                FieldKind::Attr { .. } | FieldKind::Text { .. } if check_attrs => {
                    self.get(&field)?;
                }
                _ => {}
            }
        }
        if let Some(hook) = &self.ty.hooks().validate {
            hook(self).map_err(|e| AccessError::Invalid {
                type_name: self.ty.name().to_string(),
                reason: e.message,
            })?;
        }
        Ok(())
    }

    /// Validates the instance and, recursively, all child instances.
    ///
    /// # Errors
    /// Returns the first [`AccessError`] found, visiting fields in
    /// declaration order.
    pub fn validate(&self) -> Result<(), AccessError> {
        self.validate_fields(true)?;
        for field in self.ty.fields() {
            match self.slots.get(&field.id()) {
                Some(Slot::Set(Content::Child(Some(child)))) => child.validate()?,
                Some(Slot::Set(Content::List(list))) => {
                    for child in list.iter() {
                        child.validate()?;
                    }
                }
                Some(Slot::Set(Content::Map(map))) => {
                    for child in map.values().flat_map(|l| l.iter()) {
                        child.validate()?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn slot_eq(&self, other: &Self, field: &Field) -> bool {
        if field.is_scalar() {
            return self.get(field) == other.get(field);
        }
        match (self.slots.get(&field.id()), other.slots.get(&field.id())) {
            (None, None) => true,
            (Some(Slot::Set(c)), None) | (None, Some(Slot::Set(c))) => c.is_empty(),
            (a, b) => a == b,
        }
    }
}

impl PartialEq for Xso {
    /// Instances are equal if they have the same type and every field reads
    /// the same, defaults included. Captured raw events are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self
                .ty
                .fields()
                .iter()
                .all(|field| self.slot_eq(other, field))
    }
}

impl fmt::Debug for Xso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.ty.name());
        for field in self.ty.fields() {
            match self.slots.get(&field.id()) {
                Some(Slot::Set(content)) => s.field(field.name(), content),
                Some(Slot::Incomplete) => s.field(field.name(), &"<incomplete>"),
                None => continue,
            };
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::XsoTypeBuilder;
    use crate::types::IntegerType;
    use crate::validation::{NumericRange, ValidateMode};
    use ironxso_core::Tag;

    fn leaf() -> XsoType {
        XsoTypeBuilder::new("Leaf").tag("leaf").build().unwrap()
    }

    #[test]
    fn test_unset_default_and_delete() {
        let with_default = Field::attr("a", "a").default("x").build();
        let without = Field::attr("b", "b").build();
        let ty = XsoTypeBuilder::new("T")
            .tag("t")
            .field(with_default.clone())
            .field(without.clone())
            .build()
            .unwrap();
        let mut obj = Xso::new(&ty);
        assert_eq!(obj.get(&with_default).unwrap(), Value::from("x"));
        assert!(matches!(
            obj.get(&without),
            Err(AccessError::Unset { .. })
        ));

        obj.set(&with_default, "y").unwrap();
        assert_eq!(obj.get(&with_default).unwrap(), Value::from("y"));
        obj.delete(&with_default).unwrap();
        assert_eq!(obj.get(&with_default).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_incomplete_is_distinct_and_cleared_by_write() {
        let f = Field::attr("a", "a").build();
        let ty = XsoTypeBuilder::new("T").field(f.clone()).build().unwrap();
        let mut obj = Xso::new(&ty);
        obj.mark_incomplete(&f);
        let err = obj.get(&f).unwrap_err();
        assert!(matches!(err, AccessError::Incomplete { .. }));
        assert!(err.to_string().contains("attribute value is incomplete"));
        obj.set(&f, "v").unwrap();
        assert_eq!(obj.get(&f).unwrap(), Value::from("v"));
    }

    #[test]
    fn test_set_coerces_and_validates_from_code() {
        let f = Field::attr("n", "n")
            .value_type(IntegerType)
            .validator(NumericRange::new(Some(0), Some(9)))
            .validate_mode(ValidateMode::FromCode)
            .build();
        let ty = XsoTypeBuilder::new("T").field(f.clone()).build().unwrap();
        let mut obj = Xso::new(&ty);
        assert!(matches!(
            obj.set(&f, "3"),
            Err(AccessError::InvalidValue { .. })
        ));
        assert!(matches!(
            obj.set(&f, 10),
            Err(AccessError::ValidationFailed { .. })
        ));
        obj.set(&f, 3).unwrap();
        assert_eq!(obj.get(&f).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_none_only_for_nullable_fields() {
        let jid = Field::attr("jid", "jid").build();
        let name = Field::attr("name", "name").default(Value::None).build();
        let ty = XsoTypeBuilder::new("Item")
            .tag("item")
            .fields([jid.clone(), name.clone()])
            .build()
            .unwrap();
        let mut obj = Xso::new(&ty);
        assert!(matches!(
            obj.set(&jid, Value::None),
            Err(AccessError::InvalidValue { .. })
        ));
        assert!(!obj.is_set(&jid));
        obj.set(&name, Value::None).unwrap();
        assert_eq!(obj.get(&name).unwrap(), Value::None);
    }

    #[test]
    fn test_validate_reports_in_declaration_order() {
        let failing = |name: &str| {
            XsoTypeBuilder::new(name)
                .tag(name.to_lowercase().as_str())
                .validate(|_| Err(crate::error::ValueError::new("rejected")))
                .build()
                .unwrap()
        };
        let a = failing("A");
        let b = failing("B");
        let first = Field::child("first", &[&a]).build();
        let second = Field::child("second", &[&b]).build();
        let ty = XsoTypeBuilder::new("T")
            .fields([first.clone(), second.clone()])
            .build()
            .unwrap();
        for _ in 0..16 {
            let mut obj = Xso::new(&ty);
            obj.set_child(&second, Some(Xso::new(&b))).unwrap();
            obj.set_child(&first, Some(Xso::new(&a))).unwrap();
            match obj.validate() {
                Err(AccessError::Invalid { type_name, .. }) => assert_eq!(type_name, "A"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_required_child() {
        let leaf = leaf();
        let f = Field::child("c", &[&leaf]).required().build();
        let ty = XsoTypeBuilder::new("T").field(f.clone()).build().unwrap();
        let mut obj = Xso::new(&ty);
        assert!(matches!(
            obj.child(&f),
            Err(AccessError::MissingMember { .. })
        ));
        assert!(matches!(
            obj.set_child(&f, None),
            Err(AccessError::Required { .. })
        ));
        obj.set_child(&f, Some(Xso::new(&leaf))).unwrap();
        assert!(obj.child(&f).unwrap().is_some());
        assert!(matches!(obj.delete(&f), Err(AccessError::Required { .. })));
        assert!(obj.validate().is_ok());
    }

    #[test]
    fn test_strict_child_rejects_other_types() {
        let leaf = leaf();
        let other = XsoTypeBuilder::new("Other").tag("other").build().unwrap();
        let derived = XsoTypeBuilder::new("Derived")
            .tag("derived")
            .base(&leaf)
            .build()
            .unwrap();
        let f = Field::child("c", &[&leaf]).strict().build();
        let ty = XsoTypeBuilder::new("T").field(f.clone()).build().unwrap();
        let mut obj = Xso::new(&ty);
        assert!(matches!(
            obj.set_child(&f, Some(Xso::new(&other))),
            Err(AccessError::NotCandidate { .. })
        ));
        obj.set_child(&f, Some(Xso::new(&derived))).unwrap();
    }

    #[test]
    fn test_collections_read_empty_when_unused() {
        let leaf = leaf();
        let list = Field::child_list("l", &[&leaf]).build();
        let map = Field::child_map("m", &[&leaf]).build();
        let ty = XsoTypeBuilder::new("T")
            .field(list.clone())
            .field(map.clone())
            .build()
            .unwrap();
        let mut obj = Xso::new(&ty);
        assert!(obj.children(&list).unwrap().is_empty());
        let key = Value::Tag(Tag::local("leaf"));
        assert!(obj.child_map_entry(&map, &key).unwrap().is_empty());

        obj.children_mut(&list).unwrap().push(Xso::new(&leaf));
        assert_eq!(obj.children(&list).unwrap().len(), 1);
        assert!(obj.children(&map).is_err());
    }

    #[test]
    fn test_collector_is_append_only() {
        let any = Field::collector("any").build();
        let ty = XsoTypeBuilder::new("T").field(any.clone()).build().unwrap();
        let mut obj = Xso::new(&ty);
        obj.push_collected(&any, vec![Event::End]).unwrap();
        assert_eq!(obj.collected(&any).unwrap().len(), 1);
        assert!(obj.set(&any, "x").is_err());
        assert!(obj.delete(&any).is_err());
    }

    #[test]
    fn test_equality_uses_effective_values() {
        let f = Field::attr("a", "a").default("x").build();
        let ty = XsoTypeBuilder::new("T").field(f.clone()).build().unwrap();
        let a = Xso::new(&ty);
        let mut b = Xso::new(&ty);
        b.set(&f, "x").unwrap();
        assert_eq!(a, b);
        b.set(&f, "y").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_foreign_field_is_rejected() {
        let ty = XsoTypeBuilder::new("T").build().unwrap();
        let stray = Field::attr("a", "a").build();
        let obj = Xso::new(&ty);
        assert!(matches!(
            obj.get(&stray),
            Err(AccessError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_validate_reports_unset_attribute() {
        let f = Field::attr("a", "a").build();
        let ty = XsoTypeBuilder::new("T").field(f).build().unwrap();
        assert!(matches!(
            Xso::new(&ty).validate(),
            Err(AccessError::Unset { .. })
        ));
    }
}

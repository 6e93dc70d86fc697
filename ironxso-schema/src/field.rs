//! Field descriptors.
//!
//! A [`Field`] binds one named slot of an instance to one XML construct: an
//! attribute, the element's text, or some shape of child element. Fields are
//! compared by identity, so the same field reached through several base
//! types is recognised as one.

use crate::adapters::{ElementAdapter, KeyValueAdapter, KeyedAdapter};
use crate::error::{AccessError, DefinitionError, ParseError, ValueError};
use crate::schema::{Policies, Policy, XsoType};
use crate::types::{LanguageType, StringType, ValueType, ValueTypeRef};
use crate::validation::{ValidateMode, Validator};
use crate::xso::Xso;
use ironxso_core::{Context, Tag, Value};
use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    fn next() -> Self {
        Self(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Computes a value for a field that is missing on the wire.
pub type MissingHandler = Arc<dyn Fn(&Xso, &Context) -> Option<Value> + Send + Sync>;

/// Computes the map key of a child instance.
pub type KeyFn = Arc<dyn Fn(&Xso) -> Value + Send + Sync>;

/// Absence handler for `xml:lang`: inherit the ambient language.
#[must_use]
pub fn lang_from_context(_instance: &Xso, ctx: &Context) -> Option<Value> {
    ctx.lang.clone().map(Value::Lang)
}

/// Value handling shared by attribute, text and child-text fields.
#[derive(Clone)]
pub struct Scalar {
    value_type: ValueTypeRef,
    default: Option<Value>,
    validator: Option<Arc<dyn Validator>>,
    validate_mode: ValidateMode,
    missing: Option<MissingHandler>,
    erroneous_as_absent: bool,
}

impl Scalar {
    /// The value type.
    #[must_use]
    pub fn value_type(&self) -> &dyn ValueType {
        self.value_type.as_ref()
    }

    /// The default, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns true if parse failures fall back to absence.
    #[must_use]
    pub fn erroneous_as_absent(&self) -> bool {
        self.erroneous_as_absent
    }

    /// Returns true if the field may hold [`Value::None`].
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.default.as_ref().is_some_and(Value::is_none)
    }

    /// The absence handler, if any.
    #[must_use]
    pub fn missing(&self) -> Option<&MissingHandler> {
        self.missing.as_ref()
    }

    /// Parses and validates wire text.
    ///
    /// Returns `Ok(None)` if the text is malformed and the field treats
    /// erroneous values as absent.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidValue`] or [`ParseError::ValidationFailed`].
    pub fn parse_recv(&self, field: &str, text: &str) -> Result<Option<Value>, ParseError> {
        let value = match self.value_type.parse(text) {
            Ok(value) => value,
            Err(_) if self.erroneous_as_absent => return Ok(None),
            Err(e) => {
                return Err(ParseError::InvalidValue {
                    field: field.to_string(),
                    value: text.to_string(),
                    reason: e.message,
                });
            }
        };
        if self.validate_mode.checks_recv() && !self.passes(&value) {
            return Err(ParseError::ValidationFailed {
                field: field.to_string(),
                value: text.to_string(),
            });
        }
        Ok(Some(value))
    }

    /// Coerces and validates a value assigned by program code.
    ///
    /// [`Value::None`] marks the value as absent and is only accepted by
    /// nullable fields, those whose default is [`Value::None`].
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidValue`] or [`AccessError::ValidationFailed`].
    pub fn coerce_code(&self, field: &str, value: Value) -> Result<Value, AccessError> {
        if value.is_none() {
            if self.is_nullable() {
                return Ok(value);
            }
            return Err(AccessError::InvalidValue {
                field: field.to_string(),
                reason: "field is not nullable".to_string(),
            });
        }
        let value = self
            .value_type
            .coerce(value)
            .map_err(|e| AccessError::InvalidValue {
                field: field.to_string(),
                reason: e.message,
            })?;
        if self.validate_mode.checks_code() && !self.passes(&value) {
            return Err(AccessError::ValidationFailed {
                field: field.to_string(),
            });
        }
        Ok(value)
    }

    /// Formats a value for output.
    ///
    /// # Errors
    /// Returns [`ValueError`] if the value type rejects the value.
    pub fn format(&self, value: &Value) -> Result<String, ValueError> {
        self.value_type.format(value)
    }

    fn passes(&self, value: &Value) -> bool {
        self.validator.as_ref().is_none_or(|v| v.validate(value))
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("value_type", &self.value_type.name())
            .field("default", &self.default)
            .field("validate_mode", &self.validate_mode)
            .field("erroneous_as_absent", &self.erroneous_as_absent)
            .finish_non_exhaustive()
    }
}

/// The candidate types of a child-dispatching field.
///
/// The list may grow after definition through
/// [`XsoType::register_child`].
pub struct Candidates {
    types: RwLock<Vec<XsoType>>,
}

impl Candidates {
    fn new(types: Vec<XsoType>) -> Self {
        Self {
            types: RwLock::new(types),
        }
    }

    /// Snapshot of the candidate types.
    #[must_use]
    pub fn types(&self) -> Vec<XsoType> {
        self.types.read().clone()
    }

    /// Finds the candidate for an element tag.
    #[must_use]
    pub fn for_tag(&self, tag: &Tag) -> Option<XsoType> {
        self.types
            .read()
            .iter()
            .find(|ty| ty.tag() == Some(tag))
            .cloned()
    }

    /// Returns true if `ty` is a candidate or derives from one.
    #[must_use]
    pub fn accepts(&self, ty: &XsoType) -> bool {
        self.types.read().iter().any(|c| ty.is_subtype_of(c))
    }

    pub(crate) fn register(&self, ty: XsoType) {
        self.types.write().push(ty);
    }
}

impl fmt::Debug for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.types.read().iter().map(XsoType::name))
            .finish()
    }
}

/// How a child map derives each child's key.
#[derive(Clone)]
pub enum MapKey {
    /// The child's element tag.
    Tag,
    /// The child's language, or [`Value::None`].
    Lang,
    /// A custom key function.
    Custom(KeyFn),
}

impl MapKey {
    /// Computes the key of one child instance.
    #[must_use]
    pub fn key_of(&self, child: &Xso) -> Value {
        match self {
            Self::Tag => child.xso_type().tag().cloned().into(),
            Self::Lang => child.lang().into(),
            Self::Custom(f) => f(child),
        }
    }
}

impl fmt::Debug for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => f.write_str("Tag"),
            Self::Lang => f.write_str("Lang"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Candidate tags of a tag-enumeration field and the values they stand for.
#[derive(Debug, Clone)]
pub struct TagChoices {
    choices: Vec<(Value, Tag)>,
    allow_none: bool,
}

impl TagChoices {
    /// Value represented by an element tag.
    #[must_use]
    pub fn value_for(&self, tag: &Tag) -> Option<&Value> {
        self.choices.iter().find(|(_, t)| t == tag).map(|(v, _)| v)
    }

    /// Element tag representing a value.
    #[must_use]
    pub fn tag_for(&self, value: &Value) -> Option<&Tag> {
        self.choices.iter().find(|(v, _)| v == value).map(|(_, t)| t)
    }

    /// All candidate tags.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.choices.iter().map(|(_, t)| t)
    }

    /// Returns true if the field may be absent.
    #[must_use]
    pub fn allow_none(&self) -> bool {
        self.allow_none
    }
}

/// The XML construct a field binds to.
#[derive(Debug)]
pub enum FieldKind {
    /// One attribute.
    Attr {
        /// Attribute tag.
        tag: Tag,
        /// Value handling.
        scalar: Scalar,
    },
    /// The element's character data.
    Text {
        /// Value handling.
        scalar: Scalar,
    },
    /// At most one child instance.
    Child {
        /// Candidate types.
        candidates: Candidates,
        /// Absence is an error.
        required: bool,
        /// Program writes must use a candidate type.
        strict: bool,
    },
    /// Ordered child instances.
    ChildList {
        /// Candidate types.
        candidates: Candidates,
    },
    /// Child instances grouped by key.
    ChildMap {
        /// Candidate types.
        candidates: Candidates,
        /// Key derivation.
        key: MapKey,
    },
    /// Presence of one empty child element.
    ChildFlag {
        /// Child tag.
        tag: Tag,
        /// Policies for content inside the child.
        leaf: Policies,
    },
    /// Text of one text-only child element.
    ChildText {
        /// Child tag.
        tag: Tag,
        /// Value handling.
        scalar: Scalar,
        /// Policies for content inside the child.
        leaf: Policies,
    },
    /// The tag of one child element, from a fixed set.
    ChildTag {
        /// Candidate tags.
        choices: TagChoices,
        /// Policies for content inside the child.
        leaf: Policies,
    },
    /// Verbatim copies of unmatched child subtrees.
    Collector,
    /// Foreign values carried by child elements.
    ChildValueList {
        /// Element conversion.
        adapter: Arc<dyn ElementAdapter>,
    },
    /// Foreign key/value pairs carried by child elements.
    ChildValueMap {
        /// Element conversion.
        adapter: Arc<dyn KeyedAdapter>,
    },
    /// Foreign key/value pairs, several values per key.
    ChildValueMultiMap {
        /// Element conversion.
        adapter: Arc<dyn KeyedAdapter>,
    },
}

impl FieldKind {
    /// Short kind name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Attr { .. } => "attribute",
            Self::Text { .. } => "text",
            Self::Child { .. } => "child",
            Self::ChildList { .. } => "child list",
            Self::ChildMap { .. } => "child map",
            Self::ChildFlag { .. } => "child flag",
            Self::ChildText { .. } => "child text",
            Self::ChildTag { .. } => "child tag",
            Self::Collector => "collector",
            Self::ChildValueList { .. } => "child value list",
            Self::ChildValueMap { .. } => "child value map",
            Self::ChildValueMultiMap { .. } => "child value multimap",
        }
    }
}

struct FieldInner {
    id: FieldId,
    name: String,
    kind: FieldKind,
}

/// A field descriptor. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Field(Arc<FieldInner>);

impl Field {
    /// The field's identity.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.0.id
    }

    /// The field's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The construct this field binds to.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.0.kind
    }

    /// Scalar value handling, for attribute, text and child-text fields.
    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.0.kind {
            FieldKind::Attr { scalar, .. }
            | FieldKind::Text { scalar }
            | FieldKind::ChildText { scalar, .. } => Some(scalar),
            _ => None,
        }
    }

    /// The attribute tag, for attribute fields.
    #[must_use]
    pub fn attr_tag(&self) -> Option<&Tag> {
        match &self.0.kind {
            FieldKind::Attr { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// The value read when nothing was stored.
    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        match &self.0.kind {
            FieldKind::ChildFlag { .. } => Some(Value::Bool(false)),
            FieldKind::ChildTag { choices, .. } => choices.allow_none.then_some(Value::None),
            _ => self.scalar().and_then(|s| s.default.clone()),
        }
    }

    /// Returns true for fields holding a single scalar value.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.0.kind,
            FieldKind::Attr { .. }
                | FieldKind::Text { .. }
                | FieldKind::ChildFlag { .. }
                | FieldKind::ChildText { .. }
                | FieldKind::ChildTag { .. }
        )
    }

    /// The candidate list, for fields dispatching on child types.
    #[must_use]
    pub fn candidates(&self) -> Option<&Candidates> {
        match &self.0.kind {
            FieldKind::Child { candidates, .. }
            | FieldKind::ChildList { candidates }
            | FieldKind::ChildMap { candidates, .. } => Some(candidates),
            _ => None,
        }
    }

    /// Element types parsed into instances for this field.
    pub(crate) fn element_types(&self) -> Vec<XsoType> {
        match &self.0.kind {
            FieldKind::ChildValueList { adapter } => adapter.xso_types(),
            FieldKind::ChildValueMap { adapter } | FieldKind::ChildValueMultiMap { adapter } => {
                adapter.xso_types()
            }
            _ => self.candidates().map(Candidates::types).unwrap_or_default(),
        }
    }

    /// Element tags this field claims in the child table.
    pub(crate) fn child_tags(&self) -> Result<Vec<Tag>, DefinitionError> {
        match &self.0.kind {
            FieldKind::Attr { .. } | FieldKind::Text { .. } | FieldKind::Collector => Ok(Vec::new()),
            FieldKind::ChildFlag { tag, .. } | FieldKind::ChildText { tag, .. } => {
                Ok(vec![tag.clone()])
            }
            FieldKind::ChildTag { choices, .. } => Ok(choices.tags().cloned().collect()),
            _ => self
                .element_types()
                .iter()
                .map(|ty| {
                    ty.tag().cloned().ok_or_else(|| DefinitionError::Untagged {
                        type_name: ty.name().to_string(),
                    })
                })
                .collect(),
        }
    }

    /// The element type to parse a child with the given tag into.
    pub(crate) fn element_type_for(&self, tag: &Tag) -> Option<XsoType> {
        match self.candidates() {
            Some(candidates) => candidates.for_tag(tag),
            None => self
                .element_types()
                .into_iter()
                .find(|ty| ty.tag() == Some(tag)),
        }
    }

    /// Starts an attribute field.
    pub fn attr(name: impl Into<String>, tag: impl Into<Tag>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::Attr(tag.into()))
    }

    /// Starts an `xml:lang` attribute field that inherits the ambient
    /// language when absent.
    pub fn lang_attr(name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::Attr(Tag::xml_lang()))
            .value_type(LanguageType)
            .default(Value::None)
            .missing(lang_from_context)
    }

    /// Starts a text field.
    pub fn text(name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::Text)
    }

    /// Starts a single-child field.
    pub fn child(name: impl Into<String>, candidates: &[&XsoType]) -> FieldBuilder {
        FieldBuilder::new(name, Spec::Child(owned(candidates)))
    }

    /// Starts an ordered child-list field.
    pub fn child_list(name: impl Into<String>, candidates: &[&XsoType]) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ChildList(owned(candidates)))
    }

    /// Starts a child map keyed by each child's tag.
    pub fn child_map(name: impl Into<String>, candidates: &[&XsoType]) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ChildMap(owned(candidates)))
    }

    /// Starts a child map keyed by each child's language.
    pub fn child_lang_map(name: impl Into<String>, candidates: &[&XsoType]) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ChildMap(owned(candidates))).key(MapKey::Lang)
    }

    /// Starts a flag field.
    pub fn child_flag(name: impl Into<String>, tag: impl Into<Tag>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ChildFlag(tag.into()))
    }

    /// Starts a child-text field.
    pub fn child_text(name: impl Into<String>, tag: impl Into<Tag>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ChildText(tag.into()))
    }

    /// Starts a tag-enumeration field whose value is the child's tag.
    ///
    /// Bare local names are placed in `default_ns`.
    pub fn child_tag(
        name: impl Into<String>,
        default_ns: Option<&str>,
        locals: &[&str],
    ) -> FieldBuilder {
        let choices = locals
            .iter()
            .map(|local| {
                let tag = Tag::new(default_ns, *local);
                (Value::Tag(tag.clone()), tag)
            })
            .collect();
        FieldBuilder::new(name, Spec::ChildTag(choices))
    }

    /// Starts a tag-enumeration field mapping each tag to a value.
    pub fn child_tag_enum<I, V>(name: impl Into<String>, choices: I) -> FieldBuilder
    where
        I: IntoIterator<Item = (V, Tag)>,
        V: Into<Value>,
    {
        let choices = choices.into_iter().map(|(v, t)| (v.into(), t)).collect();
        FieldBuilder::new(name, Spec::ChildTag(choices))
    }

    /// Starts a collector field.
    pub fn collector(name: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(name, Spec::Collector)
    }

    /// Starts a list of foreign values packed into child elements.
    pub fn child_value_list(
        name: impl Into<String>,
        adapter: impl ElementAdapter + 'static,
    ) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ValueList(Arc::new(adapter)))
    }

    /// Starts a map of foreign values packed into child elements.
    pub fn child_value_map(
        name: impl Into<String>,
        adapter: impl KeyedAdapter + 'static,
    ) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ValueMap(Arc::new(adapter)))
    }

    /// Starts a multimap of foreign values packed into child elements.
    pub fn child_value_multi_map(
        name: impl Into<String>,
        adapter: impl KeyedAdapter + 'static,
    ) -> FieldBuilder {
        FieldBuilder::new(name, Spec::ValueMultiMap(Arc::new(adapter)))
    }

    /// Starts a map from language to the text of `<tag xml:lang="..">`
    /// children.
    ///
    /// # Errors
    /// Returns [`DefinitionError::MalformedTag`] if `tag` is not a valid name.
    pub fn child_text_map(
        name: impl Into<String>,
        tag: impl Into<Tag>,
    ) -> Result<FieldBuilder, DefinitionError> {
        let adapter = KeyValueAdapter::text_child(tag)?;
        Ok(FieldBuilder::new(name, Spec::ValueMap(Arc::new(adapter))))
    }
}

fn owned(types: &[&XsoType]) -> Vec<XsoType> {
    types.iter().map(|ty| (*ty).clone()).collect()
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind.name())
            .finish()
    }
}

enum Spec {
    Attr(Tag),
    Text,
    Child(Vec<XsoType>),
    ChildList(Vec<XsoType>),
    ChildMap(Vec<XsoType>),
    ChildFlag(Tag),
    ChildText(Tag),
    ChildTag(Vec<(Value, Tag)>),
    Collector,
    ValueList(Arc<dyn ElementAdapter>),
    ValueMap(Arc<dyn KeyedAdapter>),
    ValueMultiMap(Arc<dyn KeyedAdapter>),
}

/// Builder for [`Field`]s.
///
/// Options that do not apply to the field's kind are ignored.
pub struct FieldBuilder {
    name: String,
    spec: Spec,
    value_type: Option<ValueTypeRef>,
    default: Option<Value>,
    validator: Option<Arc<dyn Validator>>,
    validate_mode: ValidateMode,
    missing: Option<MissingHandler>,
    erroneous_as_absent: bool,
    required: bool,
    strict: bool,
    key: MapKey,
    leaf: Policies,
    allow_none: bool,
}

impl FieldBuilder {
    fn new(name: impl Into<String>, spec: Spec) -> Self {
        Self {
            name: name.into(),
            spec,
            value_type: None,
            default: None,
            validator: None,
            validate_mode: ValidateMode::default(),
            missing: None,
            erroneous_as_absent: false,
            required: false,
            strict: false,
            key: MapKey::Tag,
            leaf: Policies::strict(),
            allow_none: false,
        }
    }

    /// Sets the value type (default: string).
    #[must_use]
    pub fn value_type(mut self, value_type: impl ValueType + 'static) -> Self {
        self.value_type = Some(Arc::new(value_type));
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets when the validator runs.
    #[must_use]
    pub fn validate_mode(mut self, mode: ValidateMode) -> Self {
        self.validate_mode = mode;
        self
    }

    /// Sets the absence handler.
    #[must_use]
    pub fn missing<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Xso, &Context) -> Option<Value> + Send + Sync + 'static,
    {
        self.missing = Some(Arc::new(handler));
        self
    }

    /// Treats unparseable wire values as absent instead of failing.
    #[must_use]
    pub fn erroneous_as_absent(mut self) -> Self {
        self.erroneous_as_absent = true;
        self
    }

    /// Makes a single-child field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts program writes of a single-child field to candidate types.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Sets the key derivation of a child map.
    #[must_use]
    pub fn key(mut self, key: MapKey) -> Self {
        self.key = key;
        self
    }

    /// Sets a custom key function for a child map.
    #[must_use]
    pub fn key_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Xso) -> Value + Send + Sync + 'static,
    {
        self.key(MapKey::Custom(Arc::new(f)))
    }

    /// Policy for elements nested inside a leaf child.
    #[must_use]
    pub fn child_policy(mut self, policy: Policy) -> Self {
        self.leaf.unknown_child = policy;
        self
    }

    /// Policy for attributes on a leaf child.
    #[must_use]
    pub fn attr_policy(mut self, policy: Policy) -> Self {
        self.leaf.unknown_attr = policy;
        self
    }

    /// Policy for text inside a flag or tag-enumeration child.
    #[must_use]
    pub fn text_policy(mut self, policy: Policy) -> Self {
        self.leaf.unknown_text = policy;
        self
    }

    /// Lets a tag-enumeration field be absent.
    #[must_use]
    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// Finishes the field.
    #[must_use]
    pub fn build(self) -> Field {
        let scalar = Scalar {
            value_type: self.value_type.unwrap_or_else(|| Arc::new(StringType)),
            default: self.default,
            validator: self.validator,
            validate_mode: self.validate_mode,
            missing: self.missing,
            erroneous_as_absent: self.erroneous_as_absent,
        };
        let kind = match self.spec {
            Spec::Attr(tag) => FieldKind::Attr { tag, scalar },
            Spec::Text => FieldKind::Text { scalar },
            Spec::Child(types) => FieldKind::Child {
                candidates: Candidates::new(types),
                required: self.required,
                strict: self.strict,
            },
            Spec::ChildList(types) => FieldKind::ChildList {
                candidates: Candidates::new(types),
            },
            Spec::ChildMap(types) => FieldKind::ChildMap {
                candidates: Candidates::new(types),
                key: self.key,
            },
            Spec::ChildFlag(tag) => FieldKind::ChildFlag {
                tag,
                leaf: self.leaf,
            },
            Spec::ChildText(tag) => FieldKind::ChildText {
                tag,
                scalar,
                leaf: self.leaf,
            },
            Spec::ChildTag(choices) => FieldKind::ChildTag {
                choices: TagChoices {
                    choices,
                    allow_none: self.allow_none,
                },
                leaf: self.leaf,
            },
            Spec::Collector => FieldKind::Collector,
            Spec::ValueList(adapter) => FieldKind::ChildValueList { adapter },
            Spec::ValueMap(adapter) => FieldKind::ChildValueMap { adapter },
            Spec::ValueMultiMap(adapter) => FieldKind::ChildValueMultiMap { adapter },
        };
        Field(Arc::new(FieldInner {
            id: FieldId::next(),
            name: self.name,
            kind,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntegerType;
    use crate::validation::NumericRange;

    #[test]
    fn test_field_identity() {
        let a = Field::attr("a", "a").build();
        let b = Field::attr("a", "a").build();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_lang_attr_defaults() {
        let f = Field::lang_attr("lang").build();
        assert_eq!(f.attr_tag(), Some(&Tag::xml_lang()));
        assert_eq!(f.default_value(), Some(Value::None));
        assert!(f.scalar().unwrap().missing().is_some());
    }

    #[test]
    fn test_parse_recv_validates() {
        let f = Field::attr("n", "n")
            .value_type(IntegerType)
            .validator(NumericRange::new(Some(0), None))
            .build();
        let scalar = f.scalar().unwrap();
        assert_eq!(scalar.parse_recv("n", "3").unwrap(), Some(Value::Int(3)));
        assert!(matches!(
            scalar.parse_recv("n", "-1"),
            Err(ParseError::ValidationFailed { .. })
        ));
        assert!(matches!(
            scalar.parse_recv("n", "x"),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_erroneous_as_absent() {
        let f = Field::attr("n", "n")
            .value_type(IntegerType)
            .erroneous_as_absent()
            .build();
        assert_eq!(f.scalar().unwrap().parse_recv("n", "x").unwrap(), None);
    }

    #[test]
    fn test_code_validation_follows_mode() {
        let recv_only = Field::attr("n", "n")
            .value_type(IntegerType)
            .validator(NumericRange::new(Some(0), None))
            .build();
        assert!(recv_only.scalar().unwrap().coerce_code("n", Value::Int(-1)).is_ok());

        let always = Field::attr("n", "n")
            .value_type(IntegerType)
            .validator(NumericRange::new(Some(0), None))
            .validate_mode(ValidateMode::Always)
            .build();
        assert!(matches!(
            always.scalar().unwrap().coerce_code("n", Value::Int(-1)),
            Err(AccessError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_child_tag_choices() {
        let f = Field::child_tag("cond", Some("uri:e"), &["a", "b"])
            .allow_none()
            .build();
        let FieldKind::ChildTag { choices, .. } = f.kind() else {
            panic!("wrong kind");
        };
        let a = Tag::qualified("uri:e", "a");
        assert_eq!(choices.value_for(&a), Some(&Value::Tag(a.clone())));
        assert_eq!(f.default_value(), Some(Value::None));
        assert_eq!(f.child_tags().unwrap().len(), 2);
    }

    #[test]
    fn test_flag_defaults_to_false() {
        let f = Field::child_flag("f", "flag").build();
        assert_eq!(f.default_value(), Some(Value::Bool(false)));
        assert!(f.is_scalar());
    }
}

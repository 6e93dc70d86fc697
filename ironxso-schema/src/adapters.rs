//! Element adapters for value-carrying child fields.
//!
//! Child-value fields store foreign values rather than instances. An adapter
//! names the element types it reads and writes and converts between one
//! parsed instance and the stored value.

use crate::builder::XsoTypeBuilder;
use crate::error::{AccessError, DefinitionError};
use crate::field::Field;
use crate::schema::XsoType;
use crate::xso::Xso;
use ironxso_core::{Tag, Value};
use std::fmt;

/// Converts between child instances and single values.
pub trait ElementAdapter: Send + Sync {
    /// Element types this adapter reads. Their tags are claimed by the field.
    fn xso_types(&self) -> Vec<XsoType>;

    /// Extracts the value carried by a parsed child.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the child lacks the needed content.
    fn unpack(&self, xso: &Xso) -> Result<Value, AccessError>;

    /// Builds the child carrying a value.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the value cannot be stored.
    fn pack(&self, value: &Value) -> Result<Xso, AccessError>;
}

/// Converts between child instances and key/value pairs.
pub trait KeyedAdapter: Send + Sync {
    /// Element types this adapter reads. Their tags are claimed by the field.
    fn xso_types(&self) -> Vec<XsoType>;

    /// Extracts the key/value pair carried by a parsed child.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the child lacks the needed content.
    fn unpack(&self, xso: &Xso) -> Result<(Value, Value), AccessError>;

    /// Builds the child carrying a key/value pair.
    ///
    /// # Errors
    /// Returns [`AccessError`] if the pair cannot be stored.
    fn pack(&self, key: &Value, value: &Value) -> Result<Xso, AccessError>;
}

impl fmt::Debug for dyn ElementAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.xso_types().iter().map(|t| t.name().to_string()).collect();
        write!(f, "ElementAdapter({})", names.join(", "))
    }
}

impl fmt::Debug for dyn KeyedAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.xso_types().iter().map(|t| t.name().to_string()).collect();
        write!(f, "KeyedAdapter({})", names.join(", "))
    }
}

/// Carries a value in one scalar field of one element type.
#[derive(Debug, Clone)]
pub struct FieldAdapter {
    ty: XsoType,
    field: Field,
}

impl FieldAdapter {
    /// Adapts `field` of `ty`.
    ///
    /// # Errors
    /// Returns [`DefinitionError::UnknownField`] if `field` is not a scalar
    /// field of `ty`.
    pub fn new(ty: &XsoType, field: &Field) -> Result<Self, DefinitionError> {
        if !ty.has_field(field) || !field.is_scalar() {
            return Err(DefinitionError::UnknownField {
                name: field.name().to_string(),
                type_name: ty.name().to_string(),
            });
        }
        Ok(Self {
            ty: ty.clone(),
            field: field.clone(),
        })
    }
}

impl ElementAdapter for FieldAdapter {
    fn xso_types(&self) -> Vec<XsoType> {
        vec![self.ty.clone()]
    }

    fn unpack(&self, xso: &Xso) -> Result<Value, AccessError> {
        xso.get(&self.field)
    }

    fn pack(&self, value: &Value) -> Result<Xso, AccessError> {
        let mut xso = Xso::new(&self.ty);
        xso.set(&self.field, value.clone())?;
        Ok(xso)
    }
}

/// Carries a key and a value in two scalar fields of one element type.
#[derive(Debug, Clone)]
pub struct KeyValueAdapter {
    ty: XsoType,
    key: Field,
    value: Field,
}

impl KeyValueAdapter {
    /// Adapts `key` and `value` of `ty`.
    ///
    /// # Errors
    /// Returns [`DefinitionError::UnknownField`] if either field is not a
    /// scalar field of `ty`.
    pub fn new(ty: &XsoType, key: &Field, value: &Field) -> Result<Self, DefinitionError> {
        for field in [key, value] {
            if !ty.has_field(field) || !field.is_scalar() {
                return Err(DefinitionError::UnknownField {
                    name: field.name().to_string(),
                    type_name: ty.name().to_string(),
                });
            }
        }
        Ok(Self {
            ty: ty.clone(),
            key: key.clone(),
            value: value.clone(),
        })
    }

    /// Adapter for `<tag xml:lang="..">text</tag>` children, keyed by
    /// language. The language is inherited from the parent when absent.
    ///
    /// # Errors
    /// Returns [`DefinitionError::MalformedTag`] if `tag` is not a valid name.
    pub fn text_child(tag: impl Into<Tag>) -> Result<Self, DefinitionError> {
        let tag = tag.into();
        let lang = Field::lang_attr("lang").build();
        let text = Field::text("text").build();
        let ty = XsoTypeBuilder::new(format!("text child {}", tag))
            .tag(tag)
            .field(lang.clone())
            .field(text.clone())
            .build()?;
        Self::new(&ty, &lang, &text)
    }
}

impl KeyedAdapter for KeyValueAdapter {
    fn xso_types(&self) -> Vec<XsoType> {
        vec![self.ty.clone()]
    }

    fn unpack(&self, xso: &Xso) -> Result<(Value, Value), AccessError> {
        Ok((xso.get(&self.key)?, xso.get(&self.value)?))
    }

    fn pack(&self, key: &Value, value: &Value) -> Result<Xso, AccessError> {
        let mut xso = Xso::new(&self.ty);
        xso.set(&self.key, key.clone())?;
        xso.set(&self.value, value.clone())?;
        Ok(xso)
    }
}

//! Value types converting between wire text and [`Value`]s.
//!
//! A [`ValueType`] parses attribute and text content received from the
//! stream, formats values for output, and coerces values assigned by
//! program code.

use crate::error::ValueError;
use ironxso_core::{LanguageTag, Tag, Value};
use std::fmt;
use std::sync::Arc;

/// Conversion between wire text and field values.
pub trait ValueType: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parses wire text.
    ///
    /// # Errors
    /// Returns [`ValueError`] if the text is not a valid representation.
    fn parse(&self, text: &str) -> Result<Value, ValueError>;

    /// Formats a value for the wire.
    ///
    /// # Errors
    /// Returns [`ValueError`] if the value is of the wrong kind.
    fn format(&self, value: &Value) -> Result<String, ValueError>;

    /// Normalises a value assigned by program code.
    ///
    /// # Errors
    /// Returns [`ValueError`] if the value cannot be represented.
    fn coerce(&self, value: Value) -> Result<Value, ValueError>;
}

impl fmt::Debug for dyn ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueType({})", self.name())
    }
}

/// Shared handle to a value type.
pub type ValueTypeRef = Arc<dyn ValueType>;

fn wrong_kind(expected: &str, value: &Value) -> ValueError {
    ValueError::new(format!("expected {}, got {}", expected, value.kind()))
}

/// Character data, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl ValueType for StringType {
    fn name(&self) -> &'static str {
        "string"
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Ok(Value::Str(text.to_string()))
    }

    fn format(&self, value: &Value) -> Result<String, ValueError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_kind("str", value))
    }

    fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match value {
            Value::Str(_) => Ok(value),
            other => Err(wrong_kind("str", &other)),
        }
    }
}

/// Signed decimal integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl ValueType for IntegerType {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        text.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ValueError::new(format!("not an integer: {}", e)))
    }

    fn format(&self, value: &Value) -> Result<String, ValueError> {
        value
            .as_int()
            .map(|i| i.to_string())
            .ok_or_else(|| wrong_kind("int", value))
    }

    fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match value {
            Value::Int(_) => Ok(value),
            other => Err(wrong_kind("int", &other)),
        }
    }
}

/// XML Schema booleans: `true`/`1` and `false`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl ValueType for BoolType {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        match text.trim() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            other => Err(ValueError::new(format!("not a boolean: {:?}", other))),
        }
    }

    fn format(&self, value: &Value) -> Result<String, ValueError> {
        match value {
            Value::Bool(true) => Ok("true".to_string()),
            Value::Bool(false) => Ok("false".to_string()),
            other => Err(wrong_kind("bool", other)),
        }
    }

    fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match value {
            Value::Bool(_) => Ok(value),
            Value::Int(i) => Ok(Value::Bool(i != 0)),
            Value::None => Ok(Value::Bool(false)),
            other => Err(wrong_kind("bool", &other)),
        }
    }
}

/// RFC 4646 language tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageType;

impl ValueType for LanguageType {
    fn name(&self) -> &'static str {
        "language"
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        LanguageTag::parse(text)
            .map(Value::Lang)
            .map_err(|e| ValueError::new(e.to_string()))
    }

    fn format(&self, value: &Value) -> Result<String, ValueError> {
        value
            .as_lang()
            .map(|l| l.as_str().to_string())
            .ok_or_else(|| wrong_kind("lang", value))
    }

    fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match value {
            Value::Lang(_) | Value::None => Ok(value),
            Value::Str(s) => self.parse(&s),
            other => Err(wrong_kind("lang", &other)),
        }
    }
}

/// Qualified names in Clark notation (`{namespace}local`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TagType;

impl ValueType for TagType {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        Tag::parse_clark(text)
            .map(Value::Tag)
            .map_err(|e| ValueError::new(e.to_string()))
    }

    fn format(&self, value: &Value) -> Result<String, ValueError> {
        value
            .as_tag()
            .map(ToString::to_string)
            .ok_or_else(|| wrong_kind("tag", value))
    }

    fn coerce(&self, value: Value) -> Result<Value, ValueError> {
        match value {
            Value::Tag(_) => Ok(value),
            Value::Str(s) => self.parse(&s),
            other => Err(wrong_kind("tag", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_parse_and_format() {
        assert_eq!(IntegerType.parse("42").unwrap(), Value::Int(42));
        assert_eq!(IntegerType.parse(" -3 ").unwrap(), Value::Int(-3));
        assert!(IntegerType.parse("10x").is_err());
        assert_eq!(IntegerType.format(&Value::Int(7)).unwrap(), "7");
        assert!(IntegerType.format(&Value::from("7")).is_err());
    }

    #[test]
    fn test_string_coerce_rejects_other_kinds() {
        assert!(StringType.coerce(Value::Int(1)).is_err());
        assert_eq!(StringType.coerce(Value::from("x")).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_bool_accepts_xsd_forms() {
        assert_eq!(BoolType.parse("1").unwrap(), Value::Bool(true));
        assert_eq!(BoolType.parse("false").unwrap(), Value::Bool(false));
        assert!(BoolType.parse("yes").is_err());
        assert_eq!(BoolType.coerce(Value::Int(2)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_language_coerces_strings() {
        let v = LanguageType.coerce(Value::from("de-DE")).unwrap();
        assert_eq!(LanguageType.format(&v).unwrap(), "de-DE");
        assert!(LanguageType.parse("").is_err());
    }

    #[test]
    fn test_tag_type_uses_clark_notation() {
        let v = TagType.parse("{uri:foo}bar").unwrap();
        assert_eq!(v, Value::Tag(Tag::qualified("uri:foo", "bar")));
        assert_eq!(TagType.format(&v).unwrap(), "{uri:foo}bar");
    }
}

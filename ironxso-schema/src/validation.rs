//! Field value validators.
//!
//! A validator accepts or rejects an already typed value. Whether it runs on
//! values received from the stream, on values assigned by program code, or
//! on both is chosen per field with [`ValidateMode`]. Defaults are never
//! validated.

use ironxso_core::Value;
use std::collections::BTreeSet;
use std::fmt;

/// When a field's validator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidateMode {
    /// Only values parsed from the stream.
    #[default]
    FromRecv,
    /// Only values assigned by program code.
    FromCode,
    /// Both.
    Always,
}

impl ValidateMode {
    /// Returns true if values from the stream are validated.
    #[must_use]
    pub const fn checks_recv(self) -> bool {
        matches!(self, Self::FromRecv | Self::Always)
    }

    /// Returns true if values from program code are validated.
    #[must_use]
    pub const fn checks_code(self) -> bool {
        matches!(self, Self::FromCode | Self::Always)
    }
}

/// Accepts or rejects a typed value.
pub trait Validator: Send + Sync {
    /// Returns true if the value is acceptable.
    fn validate(&self, value: &Value) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn validate(&self, value: &Value) -> bool {
        self(value)
    }
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

/// Accepts only members of a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictToSet {
    allowed: BTreeSet<Value>,
}

impl RestrictToSet {
    /// Creates a validator accepting exactly `values`.
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            allowed: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RestrictToSet {
    fn validate(&self, value: &Value) -> bool {
        self.allowed.contains(value)
    }
}

/// Accepts integers within an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericRange {
    min: Option<i64>,
    max: Option<i64>,
}

impl NumericRange {
    /// Creates a range; either bound may be open.
    #[must_use]
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }
}

impl Validator for NumericRange {
    fn validate(&self, value: &Value) -> bool {
        let Some(i) = value.as_int() else {
            return false;
        };
        self.min.is_none_or(|min| i >= min) && self.max.is_none_or(|max| i <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restrict_to_set() {
        let v = RestrictToSet::new(["chat", "normal"]);
        assert!(v.validate(&Value::from("chat")));
        assert!(!v.validate(&Value::from("error")));
    }

    #[test]
    fn test_numeric_range() {
        let v = NumericRange::new(Some(0), Some(10));
        assert!(v.validate(&Value::Int(0)));
        assert!(v.validate(&Value::Int(10)));
        assert!(!v.validate(&Value::Int(11)));
        assert!(!v.validate(&Value::from("5")));
        assert!(NumericRange::new(None, None).validate(&Value::Int(i64::MIN)));
    }

    #[test]
    fn test_closure_validator() {
        let v = |value: &Value| value.as_str().is_some_and(|s| !s.is_empty());
        assert!(v.validate(&Value::from("x")));
        assert!(!Validator::validate(&v, &Value::from("")));
    }

    #[test]
    fn test_modes() {
        assert!(ValidateMode::default().checks_recv());
        assert!(!ValidateMode::default().checks_code());
        assert!(ValidateMode::Always.checks_code());
        assert!(!ValidateMode::FromCode.checks_recv());
    }
}

//! Stored value model and input normalization.
//!
//! Every value that reaches a store is one of three shapes: text, a
//! double-precision number, or a boolean. Callers may hand in any of the
//! integer or float widths (or a dynamic [`serde_json::Value`]); [`Normalize`]
//! folds them into a [`Value`] once, at the write boundary, so readers never
//! inspect types at runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Value {
    /// Name of the tag, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Input rejected by [`Normalize`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnsupportedValue {
    /// The input is not text, a number, or a boolean
    #[error("unsupported type: {kind}")]
    Shape { kind: &'static str },

    /// NaN and infinities have no on-disk representation
    #[error("non-finite number: {0}")]
    NonFinite(f64),
}

impl UnsupportedValue {
    pub fn shape(kind: &'static str) -> Self {
        Self::Shape { kind }
    }
}

/// Conversion of caller input into the canonical stored [`Value`]
pub trait Normalize {
    fn normalize(self) -> Result<Value, UnsupportedValue>;
}

fn finite(n: f64) -> Result<Value, UnsupportedValue> {
    if n.is_finite() { Ok(Value::Number(n)) } else { Err(UnsupportedValue::NonFinite(n)) }
}

macro_rules! normalize_lossless_number {
    ($($ty:ty),*) => {
        $(
            impl Normalize for $ty {
                fn normalize(self) -> Result<Value, UnsupportedValue> {
                    finite(f64::from(self))
                }
            }
        )*
    };
}

normalize_lossless_number!(i8, i16, i32, u8, u16, u32, f32, f64);

// Integers wider than the f64 mantissa round to the nearest representable value.
impl Normalize for i64 {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Number(self as f64))
    }
}

impl Normalize for isize {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Number(self as f64))
    }
}

impl Normalize for i128 {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Number(self as f64))
    }
}

impl Normalize for bool {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Bool(self))
    }
}

impl Normalize for String {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Text(self))
    }
}

impl Normalize for &str {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Text(self.to_string()))
    }
}

impl Normalize for &String {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        Ok(Value::Text(self.clone()))
    }
}

impl Normalize for Value {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        match self {
            Value::Number(n) => finite(n),
            other => Ok(other),
        }
    }
}

impl Normalize for serde_json::Value {
    fn normalize(self) -> Result<Value, UnsupportedValue> {
        match self {
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => finite(f),
                None => Err(UnsupportedValue::shape("number")),
            },
            serde_json::Value::Null => Err(UnsupportedValue::shape("null")),
            serde_json::Value::Array(_) => Err(UnsupportedValue::shape("array")),
            serde_json::Value::Object(_) => Err(UnsupportedValue::shape("object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_become_numbers() {
        assert_eq!(42i8.normalize(), Ok(Value::Number(42.0)));
        assert_eq!((-7i16).normalize(), Ok(Value::Number(-7.0)));
        assert_eq!(42i32.normalize(), Ok(Value::Number(42.0)));
        assert_eq!(1_000_000i64.normalize(), Ok(Value::Number(1_000_000.0)));
        assert_eq!(3isize.normalize(), Ok(Value::Number(3.0)));
        assert_eq!((-12i128).normalize(), Ok(Value::Number(-12.0)));
        assert_eq!(i128::MAX.normalize(), Ok(Value::Number(i128::MAX as f64)));
        assert_eq!(255u8.normalize(), Ok(Value::Number(255.0)));
        assert_eq!(u32::MAX.normalize(), Ok(Value::Number(4_294_967_295.0)));
    }

    #[test]
    fn test_floats_widen() {
        assert_eq!(1.5f32.normalize(), Ok(Value::Number(1.5)));
        assert_eq!(6.25f64.normalize(), Ok(Value::Number(6.25)));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(f64::NAN.normalize(), Err(UnsupportedValue::NonFinite(_))));
        assert!(matches!(f32::INFINITY.normalize(), Err(UnsupportedValue::NonFinite(_))));
        assert!(matches!(
            Value::Number(f64::NEG_INFINITY).normalize(),
            Err(UnsupportedValue::NonFinite(_))
        ));
    }

    #[test]
    fn test_text_and_bool_pass_through() {
        assert_eq!("value".normalize(), Ok(Value::Text("value".to_string())));
        assert_eq!(String::from("owned").normalize(), Ok(Value::Text("owned".to_string())));
        assert_eq!(true.normalize(), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_json_input() {
        assert_eq!(json!("s").normalize(), Ok(Value::Text("s".to_string())));
        assert_eq!(json!(12).normalize(), Ok(Value::Number(12.0)));
        assert_eq!(json!(-0.25).normalize(), Ok(Value::Number(-0.25)));
        assert_eq!(json!(false).normalize(), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_json_structured_input_rejected() {
        assert_eq!(json!(null).normalize(), Err(UnsupportedValue::shape("null")));
        assert_eq!(json!([1, 2]).normalize(), Err(UnsupportedValue::shape("array")));
        assert_eq!(json!({"a": 1}).normalize(), Err(UnsupportedValue::shape("object")));
    }

    #[test]
    fn test_value_accessors() {
        let text = Value::Text("x".to_string());
        assert_eq!(text.as_text(), Some("x"));
        assert_eq!(text.as_number(), None);
        assert_eq!(text.kind(), "text");

        let num = Value::Number(2.0);
        assert_eq!(num.as_number(), Some(2.0));
        assert_eq!(num.as_bool(), None);

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn test_untagged_serde_shape() {
        let map: std::collections::BTreeMap<String, Value> =
            serde_json::from_str(r#"{"a":"x","b":1.5,"c":true,"d":3}"#).unwrap();
        assert_eq!(map["a"], Value::Text("x".to_string()));
        assert_eq!(map["b"], Value::Number(1.5));
        assert_eq!(map["c"], Value::Bool(true));
        assert_eq!(map["d"], Value::Number(3.0));

        assert!(serde_json::from_str::<Value>("[1]").is_err());
        assert!(serde_json::from_str::<Value>("null").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Text("hi".to_string()).to_string(), "hi");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A single hash field value.
///
/// Key-value backends usually hand hash fields back as strings while document
/// backends keep them typed. `Value` covers both: a field read from one store may
/// arrive as [`Value::String`] and leave, after coercion, as [`Value::I64`] or
/// [`Value::Bool`].
///
/// # Usage
/// ```text
/// let v1: Value = 42i64.into();
/// let v2 = Value::from("hello");
/// let v3 = val!(true);
/// let fields = fields! { "age": "30", "admin": true };
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent field value; some document stores hand these back.
    #[default]
    Null,
    Bool(bool),
    /// Integer field, e.g. a coerced `"42"`.
    I64(i64),
    F64(f64),
    /// Untyped text as a key-value engine stores it.
    String(String),
}

/// Field name to value mapping of a hash key, in field order.
pub type HashFields = IndexMap<String, Value>;

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the variant, used in log and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

/// Builds a [`HashFields`] map from `"field": value` pairs, keeping their order.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::common::HashFields::new()
    };
    ($($key:literal : $value:expr),+ $(,)?) => {{
        let mut fields = $crate::common::HashFields::new();
        $(
            fields.insert($key.to_string(), $crate::common::Value::from($value));
        )+
        fields
    }};
}

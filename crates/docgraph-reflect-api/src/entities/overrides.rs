use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Raw value of one override-dictionary entry
///
/// Providers report what they found; the core decides which values are
/// acceptable. In JSON, `false`/`true` map to [`OverrideValue::Flag`],
/// `null` to [`OverrideValue::Null`], strings to [`OverrideValue::Text`]
/// and anything else to [`OverrideValue::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum OverrideValue {
    Flag(bool),
    Text(String),
    Null,
    /// Any other value, described by its type name
    Unsupported(String),
}

impl OverrideValue {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Flag(_) => "bool",
            Self::Text(_) => "str",
            Self::Null => "None",
            Self::Unsupported(kind) => kind,
        }
    }
}

impl fmt::Display for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => write!(f, "True"),
            Self::Flag(false) => write!(f, "False"),
            Self::Text(text) => write!(f, "{:?}", text),
            Self::Null => write!(f, "None"),
            Self::Unsupported(kind) => write!(f, "<{}>", kind),
        }
    }
}

impl From<Value> for OverrideValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Flag(flag),
            Value::String(text) => Self::Text(text),
            Value::Null => Self::Null,
            Value::Number(_) => Self::Unsupported("number".to_string()),
            Value::Array(_) => Self::Unsupported("list".to_string()),
            Value::Object(_) => Self::Unsupported("dict".to_string()),
        }
    }
}

impl From<OverrideValue> for Value {
    fn from(value: OverrideValue) -> Self {
        match value {
            OverrideValue::Flag(flag) => Value::Bool(flag),
            OverrideValue::Text(text) => Value::String(text),
            OverrideValue::Null | OverrideValue::Unsupported(_) => Value::Null,
        }
    }
}

impl From<bool> for OverrideValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for OverrideValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

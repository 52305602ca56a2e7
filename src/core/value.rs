//! Purpose: Define the stored value model and its type tags.
//! Exports: `Value`, `ValueType`, `Object`.
//! Role: Closed sum type consumed by the store, literal parser, and renderer.
//! Invariants: Numbers are finite; object keys are unique and keep insertion order.
//! Invariants: `ValueType` codes 0..=5 are part of the C ABI and never change.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::core::error::{Error, ErrorKind};

pub type Object = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Null,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
            Value::Null => ValueType::Null,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    Number,
    Boolean,
    String,
    Array,
    Object,
    Null,
}

impl ValueType {
    pub const ALL: [ValueType; 6] = [
        ValueType::Number,
        ValueType::Boolean,
        ValueType::String,
        ValueType::Array,
        ValueType::Object,
        ValueType::Null,
    ];

    pub fn code(self) -> i32 {
        match self {
            ValueType::Number => 0,
            ValueType::Boolean => 1,
            ValueType::String => 2,
            ValueType::Array => 3,
            ValueType::Object => 4,
            ValueType::Null => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .into_iter()
            .find(|value_type| value_type.as_str() == tag)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidTag)
                    .with_message(format!("unknown type tag `{tag}`"))
                    .with_hint("Use one of: number, boolean, string, array, object, null.")
            })
    }
}

//! Purpose: Turn a declared type plus literal text into an owned `Value`.
//! Exports: `parse_literal`.
//! Role: Single parsing seam shared by create and modify.
//! Invariants: Parsing is pure; failures are `ParseError` and never yield partial values.
//! Invariants: Array/object literals are JSON; numbers must be finite.

use serde_json::Value as JsonValue;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Object, Value, ValueType};

pub fn parse_literal(value_type: ValueType, literal: &str) -> Result<Value, Error> {
    match value_type {
        ValueType::Number => parse_number(literal).map(Value::Number),
        ValueType::Boolean => match literal {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(parse_error(value_type, literal).with_hint("Use `true` or `false`.")),
        },
        ValueType::String => Ok(Value::String(literal.to_string())),
        ValueType::Array => match parse_json(value_type, literal)? {
            JsonValue::Array(items) => items
                .into_iter()
                .map(from_json)
                .collect::<Result<_, _>>()
                .map(Value::Array),
            _ => Err(parse_error(value_type, literal)
                .with_hint("Array literals are JSON arrays, e.g. `[1,\"a\"]`.")),
        },
        ValueType::Object => match parse_json(value_type, literal)? {
            JsonValue::Object(map) => object_from_json(map),
            _ => Err(parse_error(value_type, literal)
                .with_hint("Object literals are JSON objects, e.g. `{\"k\":1}`.")),
        },
        ValueType::Null => match literal {
            "" | "null" => Ok(Value::Null),
            _ => Err(parse_error(value_type, literal).with_hint("Use `null` or an empty literal.")),
        },
    }
}

fn parse_number(literal: &str) -> Result<f64, Error> {
    let number = literal
        .parse::<f64>()
        .map_err(|err| parse_error(ValueType::Number, literal).with_source(err))?;
    if !number.is_finite() {
        return Err(parse_error(ValueType::Number, literal)
            .with_hint("Numbers must be finite."));
    }
    Ok(number)
}

fn parse_json(value_type: ValueType, literal: &str) -> Result<JsonValue, Error> {
    serde_json::from_str(literal)
        .map_err(|err| parse_error(value_type, literal).with_source(err))
}

fn from_json(json: JsonValue) -> Result<Value, Error> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(flag) => Ok(Value::Boolean(flag)),
        JsonValue::Number(number) => number
            .as_f64()
            .filter(|number| number.is_finite())
            .map(Value::Number)
            .ok_or_else(|| {
                Error::new(ErrorKind::ParseError)
                    .with_message(format!("number `{number}` is not representable"))
            }),
        JsonValue::String(text) => Ok(Value::String(text)),
        JsonValue::Array(items) => items
            .into_iter()
            .map(from_json)
            .collect::<Result<_, _>>()
            .map(Value::Array),
        JsonValue::Object(map) => object_from_json(map),
    }
}

fn object_from_json(map: serde_json::Map<String, JsonValue>) -> Result<Value, Error> {
    let mut object = Object::with_capacity(map.len());
    for (key, value) in map {
        object.insert(key, from_json(value)?);
    }
    Ok(Value::Object(object))
}

fn parse_error(value_type: ValueType, literal: &str) -> Error {
    Error::new(ErrorKind::ParseError).with_message(format!(
        "literal `{}` is not a valid {value_type}",
        preview(literal)
    ))
}

// Keeps error messages bounded for large literals.
fn preview(literal: &str) -> String {
    const MAX_CHARS: usize = 32;
    if literal.chars().count() <= MAX_CHARS {
        return literal.to_string();
    }
    let mut out: String = literal.chars().take(MAX_CHARS).collect();
    out.push('…');
    out
}

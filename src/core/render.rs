//! Purpose: Render stored values as canonical text for external consumers.
//! Exports: `render`, `render_number`.
//! Role: Stringifier behind `get_value_as_string` and the CLI `get` command.
//! Invariants: Output re-parses (via `parse_literal` with the value's type) to an equal value.
//! Invariants: Numbers use shortest round-trip form; integral values keep `.0`.
//! Invariants: Arrays/objects are compact JSON with object keys in insertion order.

use serde_json::Value as JsonValue;

use crate::core::value::Value;

pub fn render(value: &Value) -> String {
    match value {
        Value::Number(number) => render_number(*number),
        Value::Boolean(flag) => flag.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => to_json(value).to_string(),
        Value::Null => "null".to_string(),
    }
}

pub fn render_number(number: f64) -> String {
    to_json(&Value::Number(number)).to_string()
}

fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Number(number) => serde_json::Number::from_f64(*number)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Boolean(flag) => JsonValue::Bool(*flag),
        Value::String(text) => JsonValue::String(text.clone()),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Object(object) => JsonValue::Object(
            object
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
        Value::Null => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::core::literal::parse_literal;
    use crate::core::value::{Object, Value, ValueType};

    fn number(n: f64) -> String {
        render(&Value::Number(n))
    }

    #[test]
    fn numbers_use_shortest_round_trip_form() {
        assert_eq!(number(120.5), "120.5");
        assert_eq!(number(999.0), "999.0");
        assert_eq!(number(0.1), "0.1");
        assert_eq!(number(-3.25), "-3.25");
        assert_eq!(number(1e20), "1e20");
        assert_eq!(number(1e-7), "1e-7");
    }

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(render(&Value::Boolean(true)), "true");
        assert_eq!(render(&Value::Boolean(false)), "false");
        assert_eq!(render(&Value::String("say \"hi\"".into())), "say \"hi\"");
        assert_eq!(render(&Value::Null), "null");
    }

    #[test]
    fn containers_render_compact_json_in_insertion_order() {
        let mut object = Object::new();
        object.insert("z".to_string(), Value::Number(1.0));
        object.insert("a".to_string(), Value::String("x\"y".to_string()));
        let value = Value::Array(vec![
            Value::Object(object),
            Value::Null,
            Value::Boolean(false),
            Value::Array(vec![]),
        ]);
        assert_eq!(render(&value), r#"[{"z":1.0,"a":"x\"y"},null,false,[]]"#);
    }

    #[test]
    fn renderings_parse_back_to_equal_values() {
        let cases = [
            (ValueType::Number, "120.5"),
            (ValueType::Number, "-0.000125"),
            (ValueType::Boolean, "false"),
            (ValueType::String, "Alice and Bob"),
            (ValueType::Array, r#"[1.5,"s",[true,null],{"k":[]}]"#),
            (ValueType::Object, r#"{"name":"Alice","tags":["a","b"],"nested":{"n":2}}"#),
            (ValueType::Null, "null"),
        ];
        for (value_type, literal) in cases {
            let value = parse_literal(value_type, literal).unwrap();
            let reparsed = parse_literal(value_type, &render(&value)).unwrap();
            assert_eq!(reparsed, value, "{value_type} {literal}");
        }
    }
}

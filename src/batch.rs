//! Purpose: Parse and apply one line of a `varstore apply` batch.
//! Exports: `BatchOutcome`, `apply_line`.
//! Role: Translates text commands into `Store` calls and serializable outcomes.
//! Invariants: Malformed lines are usage errors and never touch the store.
//! Invariants: The literal is the rest of the line after the type token, minus one separator.

use serde::Serialize;
use tracing::debug;
use varstore::api::{Error, ErrorKind, Store, render, to_abi_code};

#[derive(Debug, Eq, PartialEq)]
enum BatchCommand<'a> {
    Make {
        name: &'a str,
        mutability: &'a str,
        value_type: &'a str,
        literal: &'a str,
    },
    Mod {
        name: &'a str,
        value_type: &'a str,
        literal: &'a str,
    },
    Remove {
        name: &'a str,
    },
    Type {
        name: &'a str,
    },
    Get {
        name: &'a str,
    },
    List,
}

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    line: usize,
    op: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    value_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
    #[serde(skip)]
    error_kind: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: &'static str,
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl BatchOutcome {
    fn new(line: usize, op: &str) -> Self {
        Self {
            line,
            op: op.to_string(),
            ok: true,
            name: None,
            value_type: None,
            value: None,
            names: None,
            error: None,
            error_kind: None,
        }
    }

    fn failed(mut self, err: &Error) -> Self {
        self.ok = false;
        self.error_kind = Some(err.kind());
        self.error = Some(ErrorReport {
            kind: err.kind().as_str(),
            code: to_abi_code(err.kind()),
            message: err.to_string(),
            hint: err.hint().map(str::to_string),
        });
        self
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

/// Applies one input line. Returns `None` for blank and comment lines.
pub fn apply_line(store: &mut Store, line_no: usize, line: &str) -> Option<BatchOutcome> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (op, _) = split_token(trimmed);
    let outcome = BatchOutcome::new(line_no, op);
    let command = match parse_command(trimmed) {
        Ok(command) => command,
        Err(err) => {
            debug!(line = line_no, "{err}");
            return Some(outcome.failed(&err));
        }
    };
    Some(match execute(store, command, outcome) {
        Ok(outcome) => outcome,
        Err((outcome, err)) => {
            debug!(line = line_no, kind = err.kind().as_str(), "command failed");
            outcome.failed(&err)
        }
    })
}

fn execute(
    store: &mut Store,
    command: BatchCommand<'_>,
    mut outcome: BatchOutcome,
) -> Result<BatchOutcome, (BatchOutcome, Error)> {
    let result = match command {
        BatchCommand::Make {
            name,
            mutability,
            value_type,
            literal,
        } => {
            outcome.name = Some(name.to_string());
            store.create_from_tags(name, mutability, value_type, literal)
        }
        BatchCommand::Mod {
            name,
            value_type,
            literal,
        } => {
            outcome.name = Some(name.to_string());
            store.modify_from_tags(name, value_type, literal)
        }
        BatchCommand::Remove { name } => {
            outcome.name = Some(name.to_string());
            store.remove(name)
        }
        BatchCommand::Type { name } => {
            outcome.name = Some(name.to_string());
            store.get_type(name).map(|value_type| {
                outcome.value_type = Some(value_type.as_str());
            })
        }
        BatchCommand::Get { name } => {
            outcome.name = Some(name.to_string());
            store.get(name).map(|value| {
                outcome.value_type = Some(value.value_type().as_str());
                outcome.value = Some(render(value));
            })
        }
        BatchCommand::List => {
            outcome.names = Some(store.names().into_iter().map(str::to_string).collect());
            Ok(())
        }
    };
    match result {
        Ok(()) => Ok(outcome),
        Err(err) => Err((outcome, err)),
    }
}

fn parse_command(line: &str) -> Result<BatchCommand<'_>, Error> {
    let (op, rest) = split_token(line);
    match op {
        "make" => {
            let (name, rest) = required_token(rest, op, "name")?;
            let (mutability, rest) = required_token(rest, op, "mutability")?;
            let (value_type, literal) = required_token(rest, op, "type")?;
            Ok(BatchCommand::Make {
                name,
                mutability,
                value_type,
                literal,
            })
        }
        "mod" => {
            let (name, rest) = required_token(rest, op, "name")?;
            let (value_type, literal) = required_token(rest, op, "type")?;
            Ok(BatchCommand::Mod {
                name,
                value_type,
                literal,
            })
        }
        "remove" => single_name(rest, op).map(|name| BatchCommand::Remove { name }),
        "type" => single_name(rest, op).map(|name| BatchCommand::Type { name }),
        "get" => single_name(rest, op).map(|name| BatchCommand::Get { name }),
        "list" => {
            if !rest.trim().is_empty() {
                return Err(usage("`list` takes no arguments".to_string()));
            }
            Ok(BatchCommand::List)
        }
        _ => Err(usage(format!("unknown command `{op}`"))
            .with_hint("Commands: make, mod, remove, type, get, list.")),
    }
}

fn single_name<'a>(rest: &'a str, op: &str) -> Result<&'a str, Error> {
    let (name, rest) = required_token(rest, op, "name")?;
    if !rest.trim().is_empty() {
        return Err(usage(format!("`{op}` takes exactly one name")));
    }
    Ok(name)
}

fn required_token<'a>(input: &'a str, op: &str, what: &str) -> Result<(&'a str, &'a str), Error> {
    let (token, rest) = split_token(input);
    if token.is_empty() {
        return Err(usage(format!("`{op}` is missing its {what}")));
    }
    Ok((token, rest))
}

// Splits off the first whitespace-delimited token; the rest keeps everything after one separator.
fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start_matches([' ', '\t']);
    match input.find([' ', '\t']) {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    }
}

fn usage(message: String) -> Error {
    Error::new(ErrorKind::Usage).with_message(message)
}

#[cfg(test)]
mod tests {
    use super::{BatchCommand, apply_line, parse_command, split_token};
    use serde_json::{Value, json};
    use varstore::api::{ErrorKind, Store};

    fn apply_json(store: &mut Store, line: &str) -> Value {
        let outcome = apply_line(store, 1, line).expect("outcome");
        serde_json::to_value(&outcome).expect("json")
    }

    #[test]
    fn split_token_keeps_literal_spacing() {
        assert_eq!(split_token("string  two spaces"), ("string", " two spaces"));
        assert_eq!(split_token("  get"), ("get", ""));
        assert_eq!(split_token(""), ("", ""));
    }

    #[test]
    fn make_literal_is_rest_of_line() {
        let command = parse_command(r#"make cfg dynamic object {"a": [1, 2]}"#).unwrap();
        assert_eq!(
            command,
            BatchCommand::Make {
                name: "cfg",
                mutability: "dynamic",
                value_type: "object",
                literal: r#"{"a": [1, 2]}"#,
            }
        );
    }

    #[test]
    fn missing_literal_is_empty() {
        let command = parse_command("mod x null").unwrap();
        assert_eq!(
            command,
            BatchCommand::Mod {
                name: "x",
                value_type: "null",
                literal: "",
            }
        );
    }

    #[test]
    fn malformed_lines_are_usage_errors() {
        for line in ["make x dynamic", "mod", "get", "get a b", "list now", "frobnicate x"] {
            let err = parse_command(line).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "{line}");
        }
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let mut store = Store::new();
        assert!(apply_line(&mut store, 1, "").is_none());
        assert!(apply_line(&mut store, 2, "   ").is_none());
        assert!(apply_line(&mut store, 3, "# make x dynamic number 1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn scenario_outcomes_serialize_as_json() {
        let mut store = Store::new();
        assert_eq!(
            apply_json(&mut store, "make score dynamic number 120.5"),
            json!({"line": 1, "op": "make", "ok": true, "name": "score"})
        );
        assert_eq!(
            apply_json(&mut store, "get score"),
            json!({"line": 1, "op": "get", "ok": true, "name": "score", "type": "number", "value": "120.5"})
        );
        apply_json(&mut store, "make player_name const string Alice");
        let rejected = apply_json(&mut store, "mod player_name string Bob");
        assert_eq!(rejected["ok"], false);
        assert_eq!(rejected["error"]["kind"], "ConstViolation");
        assert_eq!(rejected["error"]["code"], -3);
        assert_eq!(
            apply_json(&mut store, "list"),
            json!({"line": 1, "op": "list", "ok": true, "names": ["player_name", "score"]})
        );
    }

    #[test]
    fn invalid_tags_are_reported_with_their_kind() {
        let mut store = Store::new();
        let outcome = apply_line(&mut store, 4, "make x sometimes number 1").unwrap();
        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidTag));
        let outcome = apply_line(&mut store, 5, "make x const integer 1").unwrap();
        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidTag));
        assert!(store.is_empty());
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut store = Store::new();
        let outcome = apply_line(&mut store, 1, "make greeting dynamic string hi\r").unwrap();
        assert!(outcome.error_kind().is_none());
        let value = apply_json(&mut store, "get greeting");
        assert_eq!(value["value"], "hi");
    }
}

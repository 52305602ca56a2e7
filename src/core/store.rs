//! Purpose: Own the table of named variables and enforce mutability rules.
//! Exports: `Store`, `Entry`, `Mutability`.
//! Role: Core state behind the C ABI, the Rust API, and the CLI.
//! Invariants: Names are unique and non-empty; create never overwrites.
//! Invariants: Const entries are never modified or removed.
//! Invariants: Every operation is atomic; a failed call leaves the table untouched.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::literal::parse_literal;
use crate::core::value::{Value, ValueType};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mutability {
    Const,
    Dynamic,
}

impl Mutability {
    pub fn code(self) -> i32 {
        match self {
            Mutability::Const => 0,
            Mutability::Dynamic => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mutability::Const => "const",
            Mutability::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mutability {
    type Err = Error;

    /// Accepts `const`/`constant` and `dynam`/`dynamic`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "const" | "constant" => Ok(Mutability::Const),
            "dynam" | "dynamic" => Ok(Mutability::Dynamic),
            _ => Err(Error::new(ErrorKind::InvalidTag)
                .with_message(format!("unknown mutability tag `{tag}`"))
                .with_hint("Use `const` or `dynamic`.")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    value: Value,
    mutability: Mutability,
}

impl Entry {
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }
}

#[derive(Debug, Default)]
pub struct Store {
    table: HashMap<String, Entry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        name: &str,
        mutability: Mutability,
        value_type: ValueType,
        literal: &str,
    ) -> Result<(), Error> {
        self.ensure_vacant(name)?;
        let value = parse_literal(value_type, literal).map_err(|err| err.with_name(name))?;
        debug!(variable = name, %mutability, %value_type, "variable created");
        self.table.insert(name.to_string(), Entry { value, mutability });
        Ok(())
    }

    /// Replaces the value of a dynamic variable; the type may change.
    pub fn modify(
        &mut self,
        name: &str,
        value_type: ValueType,
        literal: &str,
    ) -> Result<(), Error> {
        let entry = self.dynamic_entry_mut(name, "modify")?;
        let value = parse_literal(value_type, literal).map_err(|err| err.with_name(name))?;
        debug!(
            variable = name,
            from = %entry.value.value_type(),
            to = %value_type,
            "variable modified"
        );
        entry.value = value;
        Ok(())
    }

    /// Create from textual tags. Name checks run before tag decoding, so an existing
    /// name is always `DuplicateName` whatever the tags say.
    pub fn create_from_tags(
        &mut self,
        name: &str,
        mutability_tag: &str,
        type_tag: &str,
        literal: &str,
    ) -> Result<(), Error> {
        self.ensure_vacant(name)?;
        let mutability: Mutability = mutability_tag
            .parse()
            .map_err(|err: Error| err.with_name(name))?;
        let value_type: ValueType = type_tag
            .parse()
            .map_err(|err: Error| err.with_name(name))?;
        self.create(name, mutability, value_type, literal)
    }

    /// Modify from a textual type tag. `NotFound` and `ConstViolation` win over `InvalidTag`.
    pub fn modify_from_tags(
        &mut self,
        name: &str,
        type_tag: &str,
        literal: &str,
    ) -> Result<(), Error> {
        self.dynamic_entry_mut(name, "modify")?;
        let value_type: ValueType = type_tag
            .parse()
            .map_err(|err: Error| err.with_name(name))?;
        self.modify(name, value_type, literal)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), Error> {
        self.dynamic_entry_mut(name, "remove")?;
        self.table.remove(name);
        debug!(variable = name, "variable removed");
        Ok(())
    }

    pub fn get_type(&self, name: &str) -> Result<ValueType, Error> {
        self.get(name).map(Value::value_type)
    }

    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        self.entry(name).map(Entry::value)
    }

    pub fn mutability(&self, name: &str) -> Result<Mutability, Error> {
        self.entry(name).map(Entry::mutability)
    }

    pub fn entry(&self, name: &str) -> Result<&Entry, Error> {
        self.table.get(name).ok_or_else(|| not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn ensure_vacant(&self, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument)
                .with_message("variable name must not be empty"));
        }
        if self.table.contains_key(name) {
            return Err(Error::new(ErrorKind::DuplicateName)
                .with_message("variable already exists")
                .with_name(name)
                .with_hint("Use mod to change a dynamic variable."));
        }
        Ok(())
    }

    fn dynamic_entry_mut(&mut self, name: &str, op: &str) -> Result<&mut Entry, Error> {
        let entry = self.table.get_mut(name).ok_or_else(|| not_found(name))?;
        if entry.mutability == Mutability::Const {
            return Err(Error::new(ErrorKind::ConstViolation)
                .with_message(format!("cannot {op} a const variable"))
                .with_name(name));
        }
        Ok(entry)
    }
}

fn not_found(name: &str) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("variable not found")
        .with_name(name)
}

//! Purpose: Define the stable public Rust API boundary for varstore.
//! Exports: Store, value model, literal parsing, rendering, and error types.
//! Role: Public, additive-only surface for Rust embedders and the CLI.
//! Invariants: Semantics match the C ABI exactly; only the calling convention differs.

pub use crate::core::error::{Error, ErrorKind, to_abi_code, to_exit_code};
pub use crate::core::literal::parse_literal;
pub use crate::core::render::{render, render_number};
pub use crate::core::store::{Entry, Mutability, Store};
pub use crate::core::value::{Object, Value, ValueType};

//! Purpose: Embeddable store of named, dynamically typed variables.
//! Exports: `abi` (C-callable surface), `api` (Rust surface), `core` (store, values, errors).
//! Role: Library behind `libvarstore` (cdylib/staticlib) and the `varstore` CLI.
//! Invariants: Core modules hold no global state; only `abi` owns the process-wide session.
//! Invariants: Error kinds map 1:1 onto ABI codes and CLI exit codes.
pub mod abi;
pub mod api;
pub mod core;

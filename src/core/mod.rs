// Core modules implementing the value model, store, literal parsing, rendering, and errors.
pub mod error;
pub mod literal;
pub mod render;
pub mod store;
pub mod value;

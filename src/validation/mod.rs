//! Validation of untrusted input into branded domain types.

pub mod patterns;
mod values;
pub use values::*;

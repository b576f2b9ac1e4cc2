//! Query parameter binding and row decoding.

pub mod params;
mod rows;
pub use params::*;
pub use rows::*;

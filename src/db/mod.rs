//! Per-tenant PostgreSQL connection managers.

pub mod credentials;
pub mod manager;
pub mod registry;

pub use credentials::*;
pub use manager::*;
pub use registry::*;

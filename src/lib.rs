//! Tenant PG kit: per-tenant PostgreSQL connection managers, typed validation and small backend helpers.

pub mod config;
pub mod db;
pub mod debugging;
pub mod error;
pub mod extractors;
pub mod response;
pub mod sql;
pub mod types;
pub mod utilities;
pub mod validation;

pub use config::PoolSettings;
pub use db::{
    resolver_fn, ConnectionManager, Credentials, CredentialsResolver, EnvCredentialsResolver,
    ManagerRegistry, QueryResult, SslPolicy, StaticCredentialsResolver,
};
pub use error::{AppError, ConfigError};
pub use extractors::{TenantHeader, TENANT_ID_HEADER};
pub use response::{empty_ok, with_debugging_id, Outcome};
pub use types::{TenantId, Uuid};

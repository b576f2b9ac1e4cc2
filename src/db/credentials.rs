//! Database credentials and the resolvers that produce them per tenant.

use crate::error::{AppError, ConfigError};
use crate::types::TenantId;
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt;
use std::future::Future;

/// TLS policy for a tenant connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SslPolicy {
    Disabled,
    /// `reject_unauthorized = false` encrypts without verifying the server certificate.
    Enabled { reject_unauthorized: bool },
}

impl From<bool> for SslPolicy {
    fn from(enabled: bool) -> Self {
        if enabled {
            SslPolicy::Enabled {
                reject_unauthorized: true,
            }
        } else {
            SslPolicy::Disabled
        }
    }
}

impl SslPolicy {
    fn mode(self) -> PgSslMode {
        match self {
            SslPolicy::Disabled => PgSslMode::Disable,
            SslPolicy::Enabled {
                reject_unauthorized: false,
            } => PgSslMode::Require,
            SslPolicy::Enabled {
                reject_unauthorized: true,
            } => PgSslMode::VerifyFull,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl: SslPolicy,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ssl", &self.ssl)
            .finish()
    }
}

impl Credentials {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(self.ssl.mode())
    }
}

/// Shape of the `DB_*` environment variables.
#[derive(Debug, Deserialize)]
pub struct EnvCredentials {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default = "default_reject_unauthorized")]
    pub ssl_reject_unauthorized: bool,
}

fn default_port() -> u16 {
    5432
}

fn default_reject_unauthorized() -> bool {
    true
}

impl From<EnvCredentials> for Credentials {
    fn from(env: EnvCredentials) -> Self {
        let ssl = if env.ssl {
            SslPolicy::Enabled {
                reject_unauthorized: env.ssl_reject_unauthorized,
            }
        } else {
            SslPolicy::Disabled
        };
        Credentials {
            host: env.host,
            port: env.port,
            database: env.name,
            username: env.username,
            password: env.password,
            ssl,
        }
    }
}

/// Produces credentials for a tenant. `None` is the default tenant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialsResolver: Send + Sync {
    async fn resolve(&self, tenant: Option<TenantId>) -> Result<Credentials, AppError>;
}

/// Every tenant shares the database described by `DB_HOST`, `DB_PORT`, `DB_NAME`,
/// `DB_USERNAME`, `DB_PASSWORD`, `DB_SSL` and `DB_SSL_REJECT_UNAUTHORIZED`.
/// Variables are read on each resolution, after loading `.env` when present.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialsResolver;

impl EnvCredentialsResolver {
    pub fn new() -> Self {
        EnvCredentialsResolver
    }

    pub fn credentials_from_vars<I>(vars: I) -> Result<Credentials, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: EnvCredentials = envy::prefixed("DB_")
            .from_iter(vars)
            .map_err(|e| ConfigError::Env(format!("database credentials: {}", e)))?;
        Ok(env.into())
    }
}

#[async_trait]
impl CredentialsResolver for EnvCredentialsResolver {
    async fn resolve(&self, _tenant: Option<TenantId>) -> Result<Credentials, AppError> {
        dotenvy::dotenv().ok();
        Self::credentials_from_vars(std::env::vars())
    }
}

/// Always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentialsResolver(pub Credentials);

#[async_trait]
impl CredentialsResolver for StaticCredentialsResolver {
    async fn resolve(&self, _tenant: Option<TenantId>) -> Result<Credentials, AppError> {
        Ok(self.0.clone())
    }
}

/// Adapter returned by [`resolver_fn`].
pub struct FnResolver<F>(F);

/// Wrap an async closure as a [`CredentialsResolver`].
pub fn resolver_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(Option<TenantId>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Credentials, AppError>> + Send + 'static,
{
    FnResolver(f)
}

#[async_trait]
impl<F, Fut> CredentialsResolver for FnResolver<F>
where
    F: Fn(Option<TenantId>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Credentials, AppError>> + Send + 'static,
{
    async fn resolve(&self, tenant: Option<TenantId>) -> Result<Credentials, AppError> {
        (self.0)(tenant).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DB_HOST", "db.internal"),
        ("DB_NAME", "app"),
        ("DB_USERNAME", "svc"),
        ("DB_PASSWORD", "s3cret"),
    ];

    #[test]
    fn env_defaults_port_and_disables_ssl() {
        let c = EnvCredentialsResolver::credentials_from_vars(vars(REQUIRED)).unwrap();
        assert_eq!(c.host, "db.internal");
        assert_eq!(c.port, 5432);
        assert_eq!(c.database, "app");
        assert_eq!(c.ssl, SslPolicy::Disabled);
    }

    #[test]
    fn env_ssl_flags() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_PORT", "6543"));
        pairs.push(("DB_SSL", "true"));
        pairs.push(("DB_SSL_REJECT_UNAUTHORIZED", "false"));
        let c = EnvCredentialsResolver::credentials_from_vars(vars(&pairs)).unwrap();
        assert_eq!(c.port, 6543);
        assert_eq!(
            c.ssl,
            SslPolicy::Enabled {
                reject_unauthorized: false
            }
        );
    }

    #[test]
    fn env_missing_host_is_config_error() {
        let err = EnvCredentialsResolver::credentials_from_vars(vars(&REQUIRED[1..])).unwrap_err();
        assert_eq!(err.code(), "config_error");
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn debug_redacts_password() {
        let c = EnvCredentialsResolver::credentials_from_vars(vars(REQUIRED)).unwrap();
        let shown = format!("{:?}", c);
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn ssl_policy_maps_to_modes() {
        assert!(matches!(SslPolicy::from(false).mode(), PgSslMode::Disable));
        assert!(matches!(SslPolicy::from(true).mode(), PgSslMode::VerifyFull));
        assert!(matches!(
            SslPolicy::Enabled {
                reject_unauthorized: false
            }
            .mode(),
            PgSslMode::Require
        ));
    }

    #[tokio::test]
    async fn closure_resolver_sees_tenant() {
        let resolver = resolver_fn(|tenant: Option<TenantId>| async move {
            match tenant {
                Some(_) => Err(AppError::resolution("unknown tenant")),
                None => EnvCredentialsResolver::credentials_from_vars(vars(REQUIRED)),
            }
        });
        assert!(resolver.resolve(None).await.is_ok());
        let err = resolver.resolve(Some(TenantId::generate())).await.unwrap_err();
        assert_eq!(err.to_string(), "resolution: unknown tenant");
    }
}

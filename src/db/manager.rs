//! One tenant's connection pool and the query surface over it.

use crate::config::PoolSettings;
use crate::db::credentials::Credentials;
use crate::error::AppError;
use crate::sql::{columns_of, row_to_json, ColumnMeta, PgBindValue};
use crate::types::TenantId;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Executor, PgPool, Statement};

/// Rows of one statement plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Value>,
    /// Returned rows for row-producing statements, affected rows otherwise.
    pub row_count: u64,
    /// Result columns of the statement, reported even when no rows match.
    pub columns: Vec<ColumnMeta>,
}

/// Owns the pool for one tenant. Created through [`crate::db::ManagerRegistry`].
#[derive(Debug)]
pub struct ConnectionManager {
    tenant: Option<TenantId>,
    pool: PgPool,
}

impl ConnectionManager {
    /// Build the pool. With `eager_connect`, one connection is opened before returning.
    pub async fn open(
        tenant: Option<TenantId>,
        credentials: &Credentials,
        settings: &PoolSettings,
    ) -> Result<Self, AppError> {
        let options = credentials.connect_options();
        let pool = if settings.eager_connect {
            settings.pool_options().connect_with(options).await?
        } else {
            settings.pool_options().connect_lazy_with(options)
        };
        tracing::info!(
            tenant = ?tenant,
            host = %credentials.host,
            database = %credentials.database,
            eager = settings.eager_connect,
            "opened connection manager"
        );
        Ok(ConnectionManager { tenant, pool })
    }

    pub fn tenant(&self) -> Option<&TenantId> {
        self.tenant.as_ref()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run one statement with positional parameters (`$1`, `$2`, …). Driver failures come back
    /// as `AppError::Db` carrying the driver's message; no rows are returned on failure.
    pub async fn execute(&self, query: &str, params: &[Value]) -> Result<QueryResult, AppError> {
        tracing::debug!(tenant = ?self.tenant, sql = %query, params = ?params, "query");
        self.run(query, params).await.map_err(|e| {
            tracing::warn!(tenant = ?self.tenant, sql = %query, "query failed: {}", e);
            AppError::Db(e)
        })
    }

    async fn run(&self, query: &str, params: &[Value]) -> Result<QueryResult, sqlx::Error> {
        // Prepared first so the column list is known even when no rows come back.
        let statement = (&self.pool).prepare(query).await?;
        let columns = columns_of(statement.columns());

        let mut q = statement.query();
        for p in params {
            q = q.bind(PgBindValue::from_json(p));
        }

        let mut rows = Vec::new();
        let mut rows_affected = 0u64;
        let mut stream = (&self.pool).fetch_many(q);
        while let Some(step) = stream.try_next().await? {
            match step {
                sqlx::Either::Left(done) => rows_affected += done.rows_affected(),
                sqlx::Either::Right(row) => rows.push(row_to_json(&row)),
            }
        }

        let row_count = if rows.is_empty() {
            rows_affected
        } else {
            rows.len() as u64
        };
        Ok(QueryResult {
            rows,
            row_count,
            columns,
        })
    }

    /// Drain and close the pool. Repeated calls are no-ops.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        tracing::info!(tenant = ?self.tenant, "closed connection manager");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

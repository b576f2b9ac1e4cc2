//! Example consumer: a small HTTP service that runs a probe query against the caller's tenant database.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tenant_pg_kit::{EnvCredentialsResolver, ManagerRegistry, Outcome, PoolSettings, QueryResult, TenantHeader};
use tokio::net::TcpListener;

async fn db_probe(
    TenantHeader(tenant): TenantHeader,
    State(registry): State<Arc<ManagerRegistry>>,
) -> Json<Outcome<QueryResult>> {
    let result = match registry.get_manager(tenant).await {
        Ok(manager) => manager.execute("SELECT now() AS now, $1::text AS probe", &[serde_json::json!("ok")]).await,
        Err(e) => Err(e),
    };
    Json(result.into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tenant_pg_kit=info")),
        )
        .init();

    let registry = Arc::new(ManagerRegistry::with_resolver(
        PoolSettings::from_env()?,
        Arc::new(EnvCredentialsResolver::new()),
    ));

    let app = Router::new()
        .route("/health/db", get(db_probe))
        .with_state(Arc::clone(&registry));
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Example consumer listening on http://127.0.0.1:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    registry.close_all().await;
    Ok(())
}

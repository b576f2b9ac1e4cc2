//! Extract tenant id from request (e.g. X-Tenant-ID header).

use crate::error::AppError;
use crate::types::TenantId;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

/// Header name for tenant id. Default: `X-Tenant-ID`.
pub const TENANT_ID_HEADER: &str = "X-Tenant-ID";

/// Tenant id from the `X-Tenant-ID` header, ready to pass to
/// [`crate::ManagerRegistry::get_manager`]. A missing or blank header is the default tenant (`None`);
/// a value that is not a lowercase UUID is rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct TenantHeader(pub Option<TenantId>);

#[async_trait]
impl<S> FromRequestParts<S> for TenantHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_ID_HEADER)
            .map(|v| {
                v.to_str()
                    .map_err(|_| AppError::validation(format!("{} must be visible ASCII", TENANT_ID_HEADER)))
            })
            .transpose()?
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match value {
            Some(s) => Ok(TenantHeader(Some(TenantId::parse(s)?))),
            None => Ok(TenantHeader(None)),
        }
    }
}

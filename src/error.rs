//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("credentials resolver not set")]
    ResolverNotSet,
    #[error("environment: {0}")]
    Env(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Raised by a credentials resolver. Returned to the caller as-is.
    #[error("resolution: {0}")]
    Resolution(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("validation: {0}")]
    Validation(String),
    #[error("invariant: {0}")]
    Invariant(String),
    #[error("{source}; {debugging_id}")]
    Tagged {
        debugging_id: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn resolution(msg: impl Into<String>) -> Self {
        AppError::Resolution(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        AppError::Invariant(msg.into())
    }

    /// Attach a debugging id so the failure site can be found from logs.
    pub fn tagged(self, debugging_id: impl Into<String>) -> Self {
        AppError::Tagged {
            debugging_id: debugging_id.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code; shared by the HTTP body and [`crate::Outcome`].
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::Resolution(_) => "resolution_error",
            AppError::Db(sqlx::Error::RowNotFound) => "not_found",
            AppError::Db(_) => "database_error",
            AppError::Validation(_) => "validation_error",
            AppError::Invariant(_) => "invariant_violation",
            AppError::Tagged { source, .. } => source.code(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Resolution(_) => StatusCode::BAD_GATEWAY,
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Tagged { source, .. } => source.status(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorDetail {
    fn from(e: &AppError) -> Self {
        ErrorDetail {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail::from(&self),
        };
        (status, Json(body)).into_response()
    }
}

//! Success/failure envelope: the serialized form of `Result<T, AppError>`.

use crate::error::{AppError, ErrorDetail};
use serde::Serialize;

/// `{"success": true, "data": …}` or `{"success": false, "err": {"code", "message"}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Err(ErrorDetail),
}

#[derive(Serialize)]
struct OkBody<'a, T> {
    success: bool,
    data: &'a T,
}

#[derive(Serialize)]
struct ErrBody<'a> {
    success: bool,
    err: &'a ErrorDetail,
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Ok(data) => OkBody {
                success: true,
                data,
            }
            .serialize(serializer),
            Outcome::Err(err) => ErrBody {
                success: false,
                err,
            }
            .serialize(serializer),
        }
    }
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }
}

impl<T> From<Result<T, AppError>> for Outcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Outcome::Ok(data),
            Err(e) => Outcome::Err(ErrorDetail::from(&e)),
        }
    }
}

/// Success with no payload.
pub fn empty_ok() -> Outcome<()> {
    Outcome::Ok(())
}

/// Annotate a failure with a debugging id; successes pass through untouched.
pub fn with_debugging_id<T>(result: Result<T, AppError>, debugging_id: &str) -> Result<T, AppError> {
    result.map_err(|e| e.tagged(debugging_id))
}

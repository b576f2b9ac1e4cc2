//! Branded domain types. Each wraps a plain value that has already passed validation.

use crate::error::AppError;
use crate::validation::patterns::{ISO8601_DATE_TIME_REGEX, UUID_REGEX};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! branded_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

branded_string!(
    /// Lowercase hyphenated UUID string.
    Uuid
);
branded_string!(NonEmptyString);
branded_string!(
    /// `YYYY-MM-DDTHH:MM:SS[.fff][Z|-HH:MM]`
    Iso8601DateTime
);
branded_string!(Iso8601Date);
branded_string!(Iso8601Time);
branded_string!(JwtString);

pub type Integer = i64;
pub type RealNumber = f64;

/// Hex color code of the form `#xxxxxx`.
pub type ColorHexCodeNormalized = String;
pub type BlurHash = String;

/// Tenant identifier used as the manager registry key. `None` denotes the default tenant.
pub type TenantId = Uuid;

impl Uuid {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if UUID_REGEX.is_match(s) {
            Ok(Uuid(s.to_string()))
        } else {
            Err(AppError::validation(format!("{} is not a valid Uuid", s)))
        }
    }

    /// Random v4 id.
    pub fn generate() -> Self {
        Uuid(uuid::Uuid::new_v4().to_string())
    }
}

impl From<uuid::Uuid> for Uuid {
    fn from(u: uuid::Uuid) -> Self {
        // `uuid` renders lowercase hyphenated, matching the pattern.
        Uuid(u.to_string())
    }
}

impl std::str::FromStr for Uuid {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse(s)
    }
}

impl NonEmptyString {
    pub fn new(s: impl Into<String>) -> Result<Self, AppError> {
        let s = s.into();
        if s.is_empty() {
            return Err(AppError::validation("empty string is not a valid NonEmptyString"));
        }
        Ok(NonEmptyString(s))
    }
}

impl Iso8601DateTime {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if ISO8601_DATE_TIME_REGEX.is_match(s) {
            Ok(Iso8601DateTime(s.to_string()))
        } else {
            Err(AppError::validation(format!("{} is not a valid Iso8601DateTime", s)))
        }
    }

    pub fn from_utc(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Iso8601DateTime(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

impl Iso8601Date {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|_| Iso8601Date(s.to_string()))
            .map_err(|_| AppError::validation(format!("{} is not a valid Iso8601Date", s)))
    }
}

impl Iso8601Time {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        chrono::NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .map(|_| Iso8601Time(s.to_string()))
            .map_err(|_| AppError::validation(format!("{} is not a valid Iso8601Time", s)))
    }
}

impl JwtString {
    /// Shape check only (three dot-separated segments); signatures are not verified.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        let segments: Vec<&str> = s.split('.').collect();
        if segments.len() == 3 && segments[..2].iter().all(|seg| !seg.is_empty()) {
            Ok(JwtString(s.to_string()))
        } else {
            Err(AppError::validation("value is not a valid JwtString"))
        }
    }
}

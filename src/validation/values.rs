//! Conversions from untrusted JSON values. Every helper returns `AppError::Validation` on bad input.

use crate::error::{AppError, ConfigError};
use crate::types::{Integer, Iso8601DateTime, NonEmptyString, Uuid};
use serde_json::Value;
use std::str::FromStr;

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(v: &Value, what: &str) -> AppError {
    AppError::validation(format!("{} of type {} is not a valid {}", v, type_name(v), what))
}

pub fn iso8601_date_time_from_value(v: &Value) -> Result<Iso8601DateTime, AppError> {
    let s = v.as_str().ok_or_else(|| invalid(v, "Iso8601DateTime"))?;
    Iso8601DateTime::parse(s)
}

pub fn uuid_from_value(v: &Value) -> Result<Uuid, AppError> {
    let s = v.as_str().ok_or_else(|| invalid(v, "Uuid"))?;
    Uuid::parse(s)
}

/// Accept `v` only if it names a variant of `T`.
pub fn enum_value_from_value<T: FromStr>(v: &Value) -> Result<T, AppError> {
    v.as_str()
        .and_then(|s| s.parse::<T>().ok())
        .ok_or_else(|| AppError::validation(format!("Invalid enum value {}", v)))
}

pub fn string_from_value(v: &Value) -> Result<String, AppError> {
    v.as_str().map(str::to_string).ok_or_else(|| invalid(v, "string"))
}

pub fn non_empty_string_from_value(v: &Value) -> Result<NonEmptyString, AppError> {
    match v.as_str() {
        Some(s) if !s.is_empty() => NonEmptyString::new(s),
        _ => Err(invalid(v, "NonEmptyString")),
    }
}

/// Trims the string; blank input is rejected.
pub fn sanitized_string_from_value(v: &Value) -> Result<NonEmptyString, AppError> {
    match v.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => NonEmptyString::new(s),
        _ => Err(invalid(v, "SanitizedString")),
    }
}

/// Parses the leading integer of a string (`"42px"` is 42). Non-string input is rejected.
pub fn integer_from_value(v: &Value) -> Result<Integer, AppError> {
    let s = match v.as_str() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(invalid(v, "Integer")),
    };
    let digits = leading_integer(s.trim_start());
    digits.parse::<Integer>().map_err(|_| invalid(v, "Integer"))
}

/// Numbers pass through; strings are parsed by their leading decimal literal.
pub fn number_from_value(v: &Value) -> Result<f64, AppError> {
    if let Some(n) = v.as_f64() {
        return Ok(n);
    }
    let s = match v.as_str() {
        Some(s) if !s.is_empty() => s.trim_start(),
        _ => return Err(invalid(v, "number")),
    };
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") && s.len() - unsigned.len() <= 1 {
        return Ok(if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    leading_float(s).parse::<f64>().map_err(|_| invalid(v, "number"))
}

/// Parses a non-empty JSON string into a value.
pub fn object_from_value(v: &Value) -> Result<Value, AppError> {
    let s = match v.as_str() {
        Some(s) if !s.is_empty() => s,
        _ => return Err(invalid(v, "JSON")),
    };
    serde_json::from_str(s).map_err(|e| AppError::validation(e.to_string()))
}

/// Booleans pass through; any string is `true` only when it lowercases to "true".
pub fn boolean_from_value(v: &Value) -> Result<bool, AppError> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => Ok(s.to_lowercase() == "true"),
        _ => Err(invalid(v, "boolean")),
    }
}

pub fn required_env_var(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| {
        AppError::from(ConfigError::Env(format!("Required environment variable {} not found!", name)))
    })
}

fn leading_integer(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    &s[..end]
}

fn leading_float(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = leading_integer(s).len();
    let mut saw_digit = s[..end].bytes().any(|b| b.is_ascii_digit());
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 || saw_digit {
            saw_digit |= frac > end + 1;
            end = frac;
        }
    }
    if saw_digit && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let exp = leading_integer(&s[end + 1..]);
        if exp.bytes().any(|b| b.is_ascii_digit()) {
            end += 1 + exp.len();
        }
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    enum Role {
        Admin,
        Viewer,
    }

    impl FromStr for Role {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "admin" => Ok(Role::Admin),
                "viewer" => Ok(Role::Viewer),
                _ => Err(()),
            }
        }
    }

    #[test]
    fn enum_values() {
        assert_eq!(enum_value_from_value::<Role>(&json!("admin")).unwrap(), Role::Admin);
        assert_eq!(enum_value_from_value::<Role>(&json!("viewer")).unwrap(), Role::Viewer);
        let err = enum_value_from_value::<Role>(&json!("root")).unwrap_err();
        assert_eq!(err.to_string(), "validation: Invalid enum value \"root\"");
    }

    #[test]
    fn strings() {
        assert_eq!(string_from_value(&json!("")).unwrap(), "");
        assert!(string_from_value(&json!(3)).is_err());
        assert!(non_empty_string_from_value(&json!("")).is_err());
        assert_eq!(sanitized_string_from_value(&json!("  hi ")).unwrap().as_str(), "hi");
        assert!(sanitized_string_from_value(&json!("   ")).is_err());
    }

    #[test]
    fn integers_follow_leading_digit_rule() {
        assert_eq!(integer_from_value(&json!("42")).unwrap(), 42);
        assert_eq!(integer_from_value(&json!(" -7abc")).unwrap(), -7);
        assert_eq!(integer_from_value(&json!("3.9")).unwrap(), 3);
        assert!(integer_from_value(&json!("abc")).is_err());
        assert!(integer_from_value(&json!(42)).is_err());
        let err = integer_from_value(&json!("")).unwrap_err();
        assert_eq!(err.to_string(), "validation: \"\" of type string is not a valid Integer");
    }

    #[test]
    fn numbers() {
        assert_eq!(number_from_value(&json!(1.5)).unwrap(), 1.5);
        assert_eq!(number_from_value(&json!("2.5kg")).unwrap(), 2.5);
        assert_eq!(number_from_value(&json!(".5")).unwrap(), 0.5);
        assert_eq!(number_from_value(&json!("1e3x")).unwrap(), 1000.0);
        assert_eq!(number_from_value(&json!("-Infinity")).unwrap(), f64::NEG_INFINITY);
        assert!(number_from_value(&json!("x1")).is_err());
        assert!(number_from_value(&json!(null)).is_err());
    }

    #[test]
    fn objects_and_booleans() {
        assert_eq!(object_from_value(&json!("{\"a\":1}")).unwrap(), json!({"a": 1}));
        assert!(object_from_value(&json!("{nope")).is_err());
        assert!(object_from_value(&json!({"a": 1})).is_err());
        assert!(boolean_from_value(&json!("TRUE")).unwrap());
        assert!(!boolean_from_value(&json!("yes")).unwrap());
        assert!(boolean_from_value(&json!(true)).unwrap());
        assert!(boolean_from_value(&json!(1)).is_err());
    }

    #[test]
    fn uuid_and_date_time() {
        assert!(uuid_from_value(&json!("123e4567-e89b-12d3-a456-426614174000")).is_ok());
        assert!(uuid_from_value(&json!(7)).is_err());
        assert!(iso8601_date_time_from_value(&json!("2024-05-01T00:00:00Z")).is_ok());
        assert!(iso8601_date_time_from_value(&json!("May 1st")).is_err());
    }

    #[test]
    fn missing_env_var_is_config_error() {
        let err = required_env_var("TENANT_PG_KIT_SURELY_UNSET_VAR").unwrap_err();
        assert_eq!(err.code(), "config_error");
    }
}

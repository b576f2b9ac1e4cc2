//! Regex patterns for common input formats. Compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

pub const EMAIL_ID_PATTERN: &str = r"^.+@.+\..+$";
pub const NAME_PATTERN: &str = r"^[a-zA-Z. ]+$";
pub const PHONE_NUMBER_PATTERN: &str = r"^[6-9][0-9]{9}$";
pub const INDIAN_PHONE_NUMBER_PATTERN: &str = r"^[6-9]{1}[0-9]{9}$";
pub const PIN_CODE_PATTERN: &str = r"^[1-9]{1}[0-9]{5}$";
pub const WEBSITE_PATTERN: &str = r"^.+\..+$";
pub const UUID_PATTERN: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
pub const ISO8601_DATE_TIME_PATTERN: &str =
    r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2}(?:.\d*)?)((-(\d{2}):(\d{2})|Z)?)$";

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", pattern, e))
}

pub static EMAIL_ID_REGEX: Lazy<Regex> = Lazy::new(|| compile(EMAIL_ID_PATTERN));
pub static NAME_REGEX: Lazy<Regex> = Lazy::new(|| compile(NAME_PATTERN));
pub static PHONE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| compile(PHONE_NUMBER_PATTERN));
pub static INDIAN_PHONE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| compile(INDIAN_PHONE_NUMBER_PATTERN));
pub static PIN_CODE_REGEX: Lazy<Regex> = Lazy::new(|| compile(PIN_CODE_PATTERN));
pub static WEBSITE_REGEX: Lazy<Regex> = Lazy::new(|| compile(WEBSITE_PATTERN));
pub static UUID_REGEX: Lazy<Regex> = Lazy::new(|| compile(UUID_PATTERN));
pub static ISO8601_DATE_TIME_REGEX: Lazy<Regex> = Lazy::new(|| compile(ISO8601_DATE_TIME_PATTERN));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_patterns() {
        assert!(EMAIL_ID_REGEX.is_match("a@b.co"));
        assert!(!EMAIL_ID_REGEX.is_match("a@b"));
        assert!(NAME_REGEX.is_match("J. R. Smith"));
        assert!(!NAME_REGEX.is_match("R2D2"));
        assert!(PHONE_NUMBER_REGEX.is_match("9876543210"));
        assert!(!PHONE_NUMBER_REGEX.is_match("5876543210"));
        assert!(INDIAN_PHONE_NUMBER_REGEX.is_match("6000000000"));
        assert!(PIN_CODE_REGEX.is_match("560001"));
        assert!(!PIN_CODE_REGEX.is_match("060001"));
        assert!(WEBSITE_REGEX.is_match("example.com"));
        assert!(!WEBSITE_REGEX.is_match("localhost"));
    }

    #[test]
    fn date_time_pattern() {
        assert!(ISO8601_DATE_TIME_REGEX.is_match("2024-01-31T10:20:30Z"));
        assert!(ISO8601_DATE_TIME_REGEX.is_match("2024-01-31T10:20:30.123Z"));
        assert!(ISO8601_DATE_TIME_REGEX.is_match("2024-01-31T10:20:30-05:00"));
        assert!(ISO8601_DATE_TIME_REGEX.is_match("2024-01-31T10:20:30"));
        assert!(!ISO8601_DATE_TIME_REGEX.is_match("2024-01-31 10:20:30"));
        assert!(!ISO8601_DATE_TIME_REGEX.is_match("2024-01-31T10:20:30+05:30"));
    }
}

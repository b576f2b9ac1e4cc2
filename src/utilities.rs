//! Small collection, time and formatting helpers.

use crate::error::AppError;
use crate::types::Iso8601DateTime;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// First `Some` among the arguments.
pub fn coalesce<T: Clone>(values: &[Option<T>]) -> Option<T> {
    values.iter().find_map(|v| v.clone())
}

/// Later keys overwrite earlier ones.
pub fn kvp_list_to_map<T>(kvp_list: Vec<(String, T)>) -> HashMap<String, T> {
    kvp_list.into_iter().collect()
}

/// Removes duplicates, keeping the first occurrence of each value in its original position.
pub fn distinct<T: Clone + Eq + Hash>(values: &[T]) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(values.len());
    values.iter().filter(|v| seen.insert(*v)).cloned().collect()
}

pub fn unix_time_in_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn current_iso_timestamp() -> Iso8601DateTime {
    Iso8601DateTime::from_utc(chrono::Utc::now())
}

pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// `[0, 1, …, n - 1]`
pub fn integer_array_of_length(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Out-of-range values wrap, as with a typed-array store.
pub fn to_i8_array(values: &[i64]) -> Vec<i8> {
    values.iter().map(|&v| v as i8).collect()
}

/// Fisher-Yates shuffle driven by a `sin`-based generator, so equal seeds give equal orders.
/// A seed of 0 is treated as 1.
pub fn deterministic_shuffle<T>(mut values: Vec<T>, seed: u64) -> Vec<T> {
    let mut seed = if seed == 0 { 1 } else { seed };
    let mut seeded_random = || {
        let x = (seed as f64).sin() * 10000.0;
        seed = seed.wrapping_add(1);
        x - x.floor()
    };

    let mut current = values.len();
    while current != 0 {
        let random_index = (seeded_random() * current as f64).floor() as usize;
        current -= 1;
        values.swap(current, random_index);
    }
    values
}

pub fn ensure(condition: bool, error: &str) -> Result<(), AppError> {
    if condition {
        Ok(())
    } else {
        Err(AppError::invariant(error))
    }
}

pub fn non_null_value<T>(input: Option<T>, error: &str) -> Result<T, AppError> {
    input.ok_or_else(|| AppError::invariant(format!("Expected a non-null value; {}", error)))
}

/// The only element of `values`. Zero or several elements is an error.
pub fn singleton_value<'a, T: std::fmt::Debug>(values: &'a [T], error: &str) -> Result<&'a T, AppError> {
    match values {
        [only] => Ok(only),
        [] => Err(AppError::invariant(format!(
            "Zero values received, when one and only one was expected: []; {}",
            error
        ))),
        _ => Err(too_many(values, error)),
    }
}

/// Like [`singleton_value`] but an empty slice yields `None`.
pub fn singleton_value_or_none<'a, T: std::fmt::Debug>(
    values: &'a [T],
    error: &str,
) -> Result<Option<&'a T>, AppError> {
    match values {
        [] => Ok(None),
        [only] => Ok(Some(only)),
        _ => Err(too_many(values, error)),
    }
}

fn too_many<T: std::fmt::Debug>(values: &[T], error: &str) -> AppError {
    AppError::invariant(format!(
        "More than one value received, when one and only one was expected: {:?}; {}",
        values, error
    ))
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "June", "July", "Aug", "Sept", "Oct", "Nov", "Dec",
];

const SHORT_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// `month_index` is zero-based.
pub fn human_readable_month(month_index: usize) -> Option<&'static str> {
    MONTHS.get(month_index).copied()
}

pub fn human_readable_short_month(month_index: usize) -> Option<&'static str> {
    SHORT_MONTHS.get(month_index).copied()
}

/// 0 is Sunday. Unknown days render as an empty string.
pub fn human_readable_short_day(day: usize) -> &'static str {
    SHORT_DAYS.get(day).copied().unwrap_or("")
}

/// `13, 5` -> `"1:05 PM"`; hour 0 renders as 12.
pub fn human_readable_12_hour_string(hours: u32, minutes: u32) -> String {
    let hours12 = match hours % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if hours >= 12 { "PM" } else { "AM" };
    format!("{}:{:02} {}", hours12, minutes, suffix)
}

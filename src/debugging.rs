//! Render a request as a single JSON string for error logs.

use axum::http::{request::Parts, HeaderMap};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggableRequest<'a, B: Serialize> {
    error_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    url: String,
    headers: Vec<(String, String)>,
    body: B,
}

fn loggable<B: Serialize>(parts: &Parts, body: B, error_code: &str, error: Option<&str>) -> String {
    let entry = LoggableRequest {
        error_code,
        error,
        url: parts.uri.to_string(),
        headers: request_headers_as_pairs(&parts.headers),
        body,
    };
    serde_json::to_string(&entry).unwrap_or_else(|e| {
        tracing::warn!(error_code, "request not loggable: {}", e);
        serde_json::json!({ "errorCode": error_code }).to_string()
    })
}

/// Form fields are rendered as `[name, JSON-encoded value]` pairs.
pub fn form_request_loggable(
    parts: &Parts,
    form_data: &[(String, Value)],
    error_code: &str,
    error: Option<&str>,
) -> String {
    loggable(parts, form_data_as_pairs(form_data), error_code, error)
}

pub fn json_request_loggable(parts: &Parts, body: &Value, error_code: &str, error: Option<&str>) -> String {
    loggable(parts, body, error_code, error)
}

pub fn text_request_loggable(parts: &Parts, body: &str, error_code: &str, error: Option<&str>) -> String {
    loggable(parts, body, error_code, error)
}

/// Header values that are not visible ASCII are rendered lossily.
pub fn request_headers_as_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

pub fn form_data_as_pairs(form_data: &[(String, Value)]) -> Vec<(String, String)> {
    form_data
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect()
}

use reqwest::StatusCode;
use serde_json::Value;
use tracing::error;

/// Logs a failed backend response the same way for every call site.
pub fn log_failed_response(method: &str, path: &str, status: StatusCode, body: &str) {
    error!(
        event_name = "api.response.failed",
        event_domain = "api",
        method,
        path,
        status = status.as_u16(),
        body,
        "API response error"
    );
}

/// Logs a request that never produced a response.
pub fn log_transport_failure(method: &str, path: &str, err: &reqwest::Error) {
    error!(
        event_name = "api.request.failed",
        event_domain = "api",
        method,
        path,
        timeout = err.is_timeout(),
        "API request error: {}",
        err
    );
}

/// Pulls a human-readable message out of an error body.
///
/// Tries `detail`, then `message`, then the raw body, then the status reason.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

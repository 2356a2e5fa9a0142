//! Shared HTTP plumbing for the provider adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::errors::GlobalFoodError;
use crate::models::ProviderKind;

/// Longest error body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Build a reqwest client with a request timeout.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and decode a JSON body.
///
/// Timeouts and connection failures become `Transport`; non-success statuses
/// and undecodable bodies become `Provider`.
pub(crate) async fn send_json(
    provider: ProviderKind,
    request: RequestBuilder,
) -> Result<Value, GlobalFoodError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            GlobalFoodError::transport(provider, "request timed out")
        } else {
            GlobalFoodError::transport(provider, format!("request failed: {}", e))
        }
    })?;

    let status = response.status();
    debug!("{} responded with {}", provider, status);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GlobalFoodError::provider(
            provider,
            format!("HTTP {} - credentials rejected", status.as_u16()),
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GlobalFoodError::provider(
            provider,
            format!("HTTP {} - {}", status.as_u16(), truncate(&body)),
        ));
    }

    let text = response.text().await.map_err(|e| {
        if e.is_timeout() {
            GlobalFoodError::transport(provider, "response body timed out")
        } else {
            GlobalFoodError::transport(provider, format!("failed to read response: {}", e))
        }
    })?;

    serde_json::from_str(&text).map_err(|e| {
        GlobalFoodError::provider(provider, format!("failed to parse response: {}", e))
    })
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Number that may arrive as a JSON number or a numeric string.
pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Identifier that may arrive as a JSON string or number.
pub(crate) fn lenient_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull the list at `pointer` out of an envelope.
pub(crate) fn items_at<'a>(
    provider: ProviderKind,
    body: &'a Value,
    pointer: &str,
) -> Result<&'a Vec<Value>, GlobalFoodError> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GlobalFoodError::provider(provider, format!("response has no '{}' list", pointer))
        })
}

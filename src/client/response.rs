//! Response adaptation: status classification first, then decoding.
//!
//! Non-2xx statuses become [`Error::Client`] / [`Error::Server`]. A 2xx body
//! that does not decode into the requested shape is an [`Error::Programming`]
//! carrying the raw body.

use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Pass a 2xx response through; turn anything else into a typed error.
pub fn check_status(response: Response) -> Result<Response> {
    let status = response.status().as_u16();
    if !response.status().is_client_error() && !response.status().is_server_error() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::debug!("request failed with {status}: {body}");
    Err(Error::from_status(status, body).unwrap_or(Error::Server {
        status,
        body: String::new(),
    }))
}

/// Success check that ignores the body.
pub fn ensure_ok(response: Response) -> Result<()> {
    check_status(response)?;
    Ok(())
}

/// Body as text after the status check.
pub fn ensure_text(response: Response) -> Result<String> {
    Ok(check_status(response)?.text()?)
}

/// Body as raw bytes after the status check.
pub fn ensure_bytes(response: Response) -> Result<Vec<u8>> {
    Ok(check_status(response)?.bytes()?.to_vec())
}

/// Body as untyped JSON.
pub fn ensure_json(response: Response) -> Result<Value> {
    let (status, body) = status_and_body(response)?;
    serde_json::from_str(&body).map_err(|e| programming(status, body, e))
}

/// Body decoded into `T`.
pub fn ensure_type<T: DeserializeOwned>(response: Response) -> Result<T> {
    let (status, body) = status_and_body(response)?;
    serde_json::from_str(&body).map_err(|e| programming(status, body, e))
}

/// JSON array body; items that fail to decode are skipped with a warning.
pub fn ensure_list<T: DeserializeOwned>(response: Response) -> Result<Vec<T>> {
    let (status, items, _body) = list_items(response, None)?;
    Ok(decode_lenient(status, items))
}

/// JSON array body; the first item that fails to decode fails the call.
pub fn ensure_list_strict<T: DeserializeOwned>(response: Response) -> Result<Vec<T>> {
    let (status, items, body) = list_items(response, None)?;
    items
        .into_iter()
        .map(|item| serde_json::from_value(item))
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| programming(status, body, e))
}

/// List under `key` of an object body, or a bare array. Items are decoded
/// leniently as in [`ensure_list`].
pub fn ensure_list_at<T: DeserializeOwned>(response: Response, key: &str) -> Result<Vec<T>> {
    let (status, items, _body) = list_items(response, Some(key))?;
    Ok(decode_lenient(status, items))
}

fn status_and_body(response: Response) -> Result<(u16, String)> {
    let response = check_status(response)?;
    let status = response.status().as_u16();
    Ok((status, response.text()?))
}

fn list_items(response: Response, key: Option<&str>) -> Result<(u16, Vec<Value>, String)> {
    let (status, body) = status_and_body(response)?;
    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => return Err(programming(status, body, e)),
    };
    let items = match (value, key) {
        (Value::Array(items), _) => items,
        (Value::Object(mut map), Some(key)) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => {
                let details = format!("expected a list under \"{key}\"");
                return Err(programming(status, body, details));
            }
        },
        _ => return Err(programming(status, body, "expected a JSON list")),
    };
    Ok((status, items, body))
}

fn decode_lenient<T: DeserializeOwned>(status: u16, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(
                    "skipping list item that failed to decode (status {status}): {e}; item: {item}"
                );
                None
            }
        })
        .collect()
}

fn programming(status: u16, body: String, details: impl ToString) -> Error {
    Error::Programming {
        status,
        body,
        details: details.to_string(),
    }
}

//! Response envelope helpers.
//!
//! Every backend response is wrapped as `{ "message": ..., "data": <payload> }`.
//! A missing or `null` `data` member is an empty result (`[]` for lists, `{}`
//! for objects), never an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Take the `data` member out of an envelope, if present and non-null.
pub fn take_data(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove("data").filter(|v| !v.is_null()),
        _ => None,
    }
}

/// Payload as a raw JSON object, defaulting to `{}`.
pub fn object_value(body: Value) -> Value {
    take_data(body).unwrap_or_else(|| Value::Object(Default::default()))
}

/// Payload decoded as `T`, decoding `{}` when `data` is absent.
pub fn object<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(object_value(body)).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Payload decoded as a list, defaulting to an empty list.
pub fn list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    match take_data(body) {
        Some(data) => serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string())),
        None => Ok(Vec::new()),
    }
}

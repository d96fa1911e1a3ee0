//! Redis storage layer for identities.
//!
//! All functions are async, generic over `redis::AsyncCommands` and take the
//! connection explicitly. Data is serialized to JSON for storage in Redis.

pub mod identity;

use serde::{de::DeserializeOwned, Serialize};

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, redis::RedisError> {
    serde_json::to_string(value).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON serialize",
            e.to_string(),
        ))
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(data: &str) -> Result<T, redis::RedisError> {
    serde_json::from_str(data).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "JSON deserialize",
            e.to_string(),
        ))
    })
}

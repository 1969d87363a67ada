//! # Request Validation
//!
//! Purpose: Check an inbound payload's shape before any store access; a
//! mismatch aborts with a message naming the expected shape.

use kvdash_common::Request;
use kvdash_store::Registry;
use serde::de::DeserializeOwned;

use crate::error::{ConsoleError, ConsoleResult};

/// Deserializes the request payload into the operation's expected shape.
pub fn payload<T: DeserializeOwned>(request: &Request, expected: &str) -> ConsoleResult<T> {
    serde_json::from_value(request.data.clone()).map_err(|err| {
        ConsoleError::Validation(format!(
            "{} expects {expected}: {err}",
            request.operation
        ))
    })
}

/// Rejects empty keys before any store access.
pub fn require_key(key: &str) -> ConsoleResult<()> {
    if key.is_empty() {
        return Err(ConsoleError::Validation("key can't be empty".to_string()));
    }
    Ok(())
}

/// Validates the (server, db) selector against the configured endpoints.
pub fn validate_selector(registry: &Registry, server: usize, db: u32) -> ConsoleResult<()> {
    let Some(endpoint) = registry.endpoint(server) else {
        return Err(ConsoleError::Validation(format!(
            "no server configured at index {server}"
        )));
    };
    if db >= endpoint.databases {
        return Err(ConsoleError::Validation(format!(
            "database {db} out of range for \"{}\"",
            endpoint.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdash_common::{GetKeyPayload, OP_GET_KEY};
    use kvdash_store::EndpointConfig;
    use serde_json::json;

    #[test]
    fn extracts_well_shaped_payloads() {
        let request = Request::new(OP_GET_KEY, json!({"key": "user:1", "field": "na"}));
        let payload: GetKeyPayload = payload(&request, "{\"key\": string}").unwrap();
        assert_eq!(payload.key, "user:1");
        assert_eq!(payload.field.as_deref(), Some("na"));
    }

    #[test]
    fn names_the_expected_shape_on_mismatch() {
        let request = Request::new(OP_GET_KEY, json!({"key": 7}));
        let err = payload::<GetKeyPayload>(&request, "{\"key\": string}").unwrap_err();
        assert_eq!(err.code(), "validation");
        assert!(err.to_string().contains("{\"key\": string}"));
    }

    #[test]
    fn rejects_empty_keys() {
        assert!(require_key("user:1").is_ok());
        assert!(require_key("").is_err());
    }

    #[test]
    fn selector_bounds_are_checked() {
        let registry = Registry::new(vec![EndpointConfig::memory("demo")]);
        assert!(validate_selector(&registry, 0, 0).is_ok());
        assert!(validate_selector(&registry, 1, 0).is_err());
        assert!(validate_selector(&registry, 0, 5).is_err());
    }
}

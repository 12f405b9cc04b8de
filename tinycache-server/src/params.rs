//! Request bodies accepted by the HTTP API and their validation.
//!
//! Field names are lower-case; the capitalised spellings are accepted too.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tinycache_core::Value;

/// Error body returned for every rejected request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{op}: {err}")]
pub struct ApiError {
    pub op: String,
    pub err: String,
}

impl ApiError {
    pub fn new(op: &str, err: impl Into<String>) -> Self {
        Self {
            op: op.to_string(),
            err: err.into(),
        }
    }
}

/// A request body that still has to be checked before reaching the store
pub trait Validate: DeserializeOwned {
    type Valid;

    fn validate(self) -> Result<Self::Valid, String>;
}

/// Decodes a JSON body and validates it, tagging failures with `op`
pub fn decode<P: Validate>(op: &str, body: &[u8]) -> Result<P::Valid, ApiError> {
    let params: P = serde_json::from_slice(body).map_err(|e| ApiError::new(op, e.to_string()))?;
    params.validate().map_err(|e| ApiError::new(op, e))
}

#[derive(Debug, Deserialize)]
pub struct SetParams {
    #[serde(default, alias = "Key")]
    pub key: String,
    #[serde(default, alias = "Value")]
    pub value: Option<Value>,
    /// Nanoseconds; zero means no expiration
    #[serde(default, alias = "Ttl")]
    pub ttl: i64,
}

#[derive(Debug, PartialEq)]
pub struct SetCommand {
    pub key: String,
    pub value: Value,
    pub ttl: Duration,
}

impl Validate for SetParams {
    type Valid = SetCommand;

    fn validate(self) -> Result<SetCommand, String> {
        if self.key.is_empty() {
            return Err("key argument must be specified".into());
        }
        let Some(value) = self.value else {
            return Err("value argument must be specified".into());
        };
        let ttl = u64::try_from(self.ttl).map_err(|_| "ttl argument must be non-negative")?;

        Ok(SetCommand {
            key: self.key,
            value,
            ttl: Duration::from_nanos(ttl),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GetParams {
    #[serde(default, alias = "Key")]
    pub key: String,
}

impl Validate for GetParams {
    type Valid = String;

    fn validate(self) -> Result<String, String> {
        if self.key.is_empty() {
            return Err("key argument must be specified".into());
        }
        Ok(self.key)
    }
}

#[derive(Debug, Deserialize)]
pub struct DelParams {
    #[serde(default, alias = "Keys")]
    pub keys: Vec<String>,
}

impl Validate for DelParams {
    type Valid = Vec<String>;

    fn validate(self) -> Result<Vec<String>, String> {
        if self.keys.is_empty() {
            return Err("at least one key must be in keys argument".into());
        }
        Ok(self.keys)
    }
}

#[derive(Debug, Deserialize)]
pub struct KeysParams {
    #[serde(default, alias = "Pattern")]
    pub pattern: String,
}

impl Validate for KeysParams {
    type Valid = String;

    fn validate(self) -> Result<String, String> {
        if self.pattern.is_empty() {
            return Err("pattern argument must be specified".into());
        }
        Ok(self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_params_valid() {
        let cmd = decode::<SetParams>("SET", br#"{"key": "K", "value": {"a": 1}, "ttl": 1000000}"#)
            .unwrap();
        assert_eq!(
            cmd,
            SetCommand {
                key: "K".into(),
                value: json!({"a": 1}),
                ttl: Duration::from_millis(1),
            }
        );
    }

    #[test]
    fn test_set_params_capitalised_fields() {
        let cmd = decode::<SetParams>("SET", br#"{"Key": "K", "Value": "V", "Ttl": 0}"#).unwrap();
        assert_eq!(cmd.key, "K");
        assert_eq!(cmd.value, json!("V"));
        assert_eq!(cmd.ttl, Duration::ZERO);
    }

    #[test]
    fn test_set_params_ttl_defaults_to_zero() {
        let cmd = decode::<SetParams>("SET", br#"{"key": "K", "value": 1}"#).unwrap();
        assert_eq!(cmd.ttl, Duration::ZERO);
    }

    #[test]
    fn test_set_params_rejected() {
        let cases: [&[u8]; 6] = [
            br#"{"key": "K", "ttl": 0}"#,
            br#"{"key": "K", "value": null}"#,
            br#"{"kei": "K", "value": "V", "ttl": 100}"#,
            br#"{"key": "K", "value": "V", "ttl": -10}"#,
            br#"{"key": "K", "value": "V", "ttl": "0"}"#,
            br#"{"key": "Ktl": "0"}"#,
        ];

        for (i, body) in cases.iter().enumerate() {
            let err = decode::<SetParams>("SET", body).unwrap_err();
            assert_eq!(err.op, "SET", "case {}", i);
        }
    }

    #[test]
    fn test_set_params_error_messages() {
        let err = decode::<SetParams>("SET", br#"{"value": "V"}"#).unwrap_err();
        assert_eq!(err.err, "key argument must be specified");

        let err = decode::<SetParams>("SET", br#"{"key": "K"}"#).unwrap_err();
        assert_eq!(err.err, "value argument must be specified");

        let err = decode::<SetParams>("SET", br#"{"key": "K", "value": 1, "ttl": -1}"#).unwrap_err();
        assert_eq!(err.err, "ttl argument must be non-negative");
        assert_eq!(err.to_string(), "SET: ttl argument must be non-negative");
    }

    #[test]
    fn test_get_params() {
        assert_eq!(decode::<GetParams>("GET", br#"{"key": "K"}"#).unwrap(), "K");
        assert!(decode::<GetParams>("GET", br#"{}"#).is_err());
        assert!(decode::<GetParams>("GET", br#"{"key": ""}"#).is_err());
    }

    #[test]
    fn test_del_params() {
        assert_eq!(
            decode::<DelParams>("DEL", br#"{"keys": ["a", "b"]}"#).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(
            decode::<DelParams>("DEL", br#"{"keys": []}"#).unwrap_err().err,
            "at least one key must be in keys argument"
        );
        assert!(decode::<DelParams>("DEL", br#"{}"#).is_err());
        assert!(decode::<DelParams>("DEL", br#"{"keys": "a"}"#).is_err());
    }

    #[test]
    fn test_keys_params() {
        assert_eq!(decode::<KeysParams>("KEYS", br#"{"Pattern": "h*"}"#).unwrap(), "h*");
        assert!(decode::<KeysParams>("KEYS", br#"{"pattern": ""}"#).is_err());
    }
}

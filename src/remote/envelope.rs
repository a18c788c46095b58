// ABOUTME: Uniform JSON result envelope for remote operation results.
// ABOUTME: Distinguishes "returned null" from "failed with message".

use serde::{Deserialize, Serialize};

/// `{"result": "..."}` on success (no field for a null result),
/// `{"exception": "..."}` on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl ResultEnvelope {
    pub fn success(result: Option<String>) -> Self {
        Self {
            result,
            exception: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            exception: Some(message.into()),
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<Option<String>, E>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }

    pub fn is_exception(&self) -> bool {
        self.exception.is_some()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The result value, or the remote failure message.
    pub fn into_result(self) -> Result<Option<String>, String> {
        match self.exception {
            Some(message) => Err(message),
            None => Ok(self.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_result_serializes_to_empty_object() {
        assert_eq!(ResultEnvelope::success(None).to_json().unwrap(), "{}");
        assert_eq!(
            ResultEnvelope::from_json("{}").unwrap().into_result(),
            Ok(None)
        );
    }

    #[test]
    fn failure_keeps_message() {
        let json = ResultEnvelope::failure("no such container").to_json().unwrap();
        assert_eq!(json, r#"{"exception":"no such container"}"#);
        let back = ResultEnvelope::from_json(&json).unwrap();
        assert!(back.is_exception());
        assert_eq!(back.into_result(), Err("no such container".to_string()));
    }

    #[test]
    fn from_result_maps_errors_to_exception() {
        let env = ResultEnvelope::from_result::<String>(Err("boom".to_string()));
        assert_eq!(env.exception.as_deref(), Some("boom"));
        let env = ResultEnvelope::from_result::<String>(Ok(Some("c1".to_string())));
        assert_eq!(env.result.as_deref(), Some("c1"));
    }
}

//! Ephemeral resource contract

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::diagnostics::Diagnostics;
use super::schema::Schema;

/// Outcome of opening an ephemeral resource
///
/// `result` is absent whenever an error diagnostic was raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenResponse {
    pub result: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl OpenResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_error(summary, detail);
        Self::from_diagnostics(diagnostics)
    }

    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            result: None,
            diagnostics,
        }
    }
}

/// A request-scoped value computed at evaluation time and never persisted
#[async_trait]
pub trait EphemeralResource: Send + Sync {
    /// Suffix appended to the provider type name, e.g. `_environment_variable`
    fn type_suffix(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn open(&self, config: Value) -> OpenResponse;
}

/// Decode a configuration object into a resource model
pub fn decode_config<T: DeserializeOwned>(config: Value) -> Result<T, Diagnostics> {
    let config = if config.is_null() {
        Value::Object(Default::default())
    } else {
        config
    };
    serde_json::from_value(config).map_err(|e| {
        let mut diags = Diagnostics::new();
        diags.add_error("Error reading configuration", e.to_string());
        diags
    })
}

/// Encode a resource model as the open result
pub fn encode_result<T: Serialize>(model: &T) -> OpenResponse {
    match serde_json::to_value(model) {
        Ok(value) => OpenResponse::ok(value),
        Err(e) => OpenResponse::error("Error setting result", e.to_string()),
    }
}

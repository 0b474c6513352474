//! `azidentity_environment_variable`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::framework::{
    decode_config, encode_result, Attribute, AttributeKind, EphemeralResource, OpenResponse, Schema,
};

#[derive(Serialize, Deserialize)]
struct EnvironmentVariableModel {
    key: String,
    value: Option<String>,
}

/// Reads one variable from the plugin's environment
///
/// Unset yields a null `value`; set-but-empty yields `""`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentVariable;

impl EnvironmentVariable {
    pub fn new() -> Self {
        Self
    }
}

fn lookup(key: &str) -> Option<String> {
    std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
}

#[async_trait]
impl EphemeralResource for EnvironmentVariable {
    fn type_suffix(&self) -> &'static str {
        "_environment_variable"
    }

    fn schema(&self) -> Schema {
        Schema::new("Value of an environment variable of the provider process.")
            .attribute(
                Attribute::required("key", AttributeKind::String)
                    .describe("Name of the environment variable."),
            )
            .attribute(
                Attribute::computed("value", AttributeKind::String)
                    .sensitive()
                    .describe("Value of the variable; null when it is not set."),
            )
    }

    async fn open(&self, config: Value) -> OpenResponse {
        let diagnostics = self.schema().validate(&config);
        if diagnostics.has_error() {
            return OpenResponse::from_diagnostics(diagnostics);
        }
        let mut model: EnvironmentVariableModel = match decode_config(config) {
            Ok(model) => model,
            Err(diagnostics) => return OpenResponse::from_diagnostics(diagnostics),
        };

        model.value = lookup(&model.key);
        encode_result(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_variable() {
        std::env::set_var("AZIDENTITY_TEST_ENV_SET", "ze-value");
        let response = EnvironmentVariable::new()
            .open(json!({"key": "AZIDENTITY_TEST_ENV_SET"}))
            .await;
        assert_eq!(
            response.result,
            Some(json!({"key": "AZIDENTITY_TEST_ENV_SET", "value": "ze-value"}))
        );
    }

    #[tokio::test]
    async fn test_empty_variable() {
        std::env::set_var("AZIDENTITY_TEST_ENV_EMPTY", "");
        let response = EnvironmentVariable::new()
            .open(json!({"key": "AZIDENTITY_TEST_ENV_EMPTY"}))
            .await;
        assert_eq!(response.result.unwrap()["value"], "");
    }

    #[tokio::test]
    async fn test_unset_variable() {
        std::env::remove_var("AZIDENTITY_TEST_ENV_UNSET");
        let response = EnvironmentVariable::new()
            .open(json!({"key": "AZIDENTITY_TEST_ENV_UNSET"}))
            .await;
        assert_eq!(response.result.unwrap()["value"], Value::Null);
    }

    #[tokio::test]
    async fn test_key_required() {
        let response = EnvironmentVariable::new().open(json!({})).await;
        assert!(response.result.is_none());
        assert!(response.diagnostics.has_error());
    }
}

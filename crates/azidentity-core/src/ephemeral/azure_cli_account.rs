//! `azidentity_azure_cli_account`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{fail, Fallible};
use crate::exec::{CommandRunner, CommandSpec};
use crate::framework::{
    decode_config, encode_result, Attribute, AttributeKind, EphemeralResource, OpenResponse, Schema,
};
use crate::logging::SharedLogger;

const RUN_FAILED: &str = "Failed to run Azure CLI account show command";

#[derive(Serialize, Deserialize)]
struct AzureCliAccountModel {
    azure_config_dir: Option<String>,
    continue_on_error: Option<bool>,
    subscription_id: Option<String>,
    tenant_id: Option<String>,
    json_result: Option<String>,
    success: Option<bool>,
    error: Option<String>,
}

impl Fallible for AzureCliAccountModel {
    fn set_failure(&mut self, error: String) {
        self.success = Some(false);
        self.error = Some(error);
    }
}

/// The subset of `az account show` output exposed as attributes
///
/// Absent or null fields read as empty strings; only a non-object or a wrongly typed
/// field fails.
#[derive(Deserialize)]
struct Account {
    id: Option<String>,
    #[serde(rename = "tenantId")]
    tenant_id: Option<String>,
}

/// Re-serialize JSON text without insignificant whitespace
fn compact_json(input: &str) -> Result<String, String> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| format!("failed to unmarshal JSON: {}", e))?;
    serde_json::to_string(&value).map_err(|e| format!("failed to marshal JSON: {}", e))
}

/// The account the Azure CLI is currently signed in to
pub struct AzureCliAccount {
    runner: Arc<dyn CommandRunner>,
    logger: SharedLogger,
}

impl AzureCliAccount {
    pub fn new(runner: Arc<dyn CommandRunner>, logger: SharedLogger) -> Self {
        Self { runner, logger }
    }

    fn command(model: &AzureCliAccountModel) -> CommandSpec {
        let spec = CommandSpec::new("az").args(["account", "show", "--output", "json"]);
        match model.azure_config_dir.as_deref() {
            Some(dir) if !dir.is_empty() => spec.env("AZURE_CONFIG_DIR", dir),
            _ => spec,
        }
    }
}

#[async_trait]
impl EphemeralResource for AzureCliAccount {
    fn type_suffix(&self) -> &'static str {
        "_azure_cli_account"
    }

    fn schema(&self) -> Schema {
        Schema::new("The Azure CLI's current account, as reported by `az account show`.")
            .attribute(
                Attribute::optional("azure_config_dir", AttributeKind::String)
                    .describe("Azure CLI configuration directory, exported as AZURE_CONFIG_DIR for the command."),
            )
            .attribute(
                Attribute::optional("continue_on_error", AttributeKind::Bool)
                    .describe("Report a failure through success/error instead of failing. The default is false."),
            )
            .attribute(
                Attribute::computed("subscription_id", AttributeKind::String)
                    .describe("ID of the current subscription."),
            )
            .attribute(
                Attribute::computed("tenant_id", AttributeKind::String)
                    .describe("Tenant of the current subscription."),
            )
            .attribute(
                Attribute::computed("json_result", AttributeKind::String)
                    .describe("Full `az account show` output as compact JSON."),
            )
            .attribute(
                Attribute::computed("success", AttributeKind::Bool)
                    .describe("Whether the account was read."),
            )
            .attribute(
                Attribute::computed("error", AttributeKind::String)
                    .describe("Error message when reading the account failed."),
            )
    }

    async fn open(&self, config: Value) -> OpenResponse {
        let diagnostics = self.schema().validate(&config);
        if diagnostics.has_error() {
            return OpenResponse::from_diagnostics(diagnostics);
        }
        let mut model: AzureCliAccountModel = match decode_config(config) {
            Ok(model) => model,
            Err(diagnostics) => return OpenResponse::from_diagnostics(diagnostics),
        };
        let continue_on_error = model.continue_on_error.unwrap_or(false);

        let output = match self.runner.run(&Self::command(&model)).await {
            Ok(output) => output,
            Err(e) => return fail(model, continue_on_error, RUN_FAILED, e.to_string()),
        };
        if !output.stderr.is_empty() {
            return fail(model, continue_on_error, RUN_FAILED, output.stderr);
        }

        let compacted = match compact_json(&output.stdout) {
            Ok(compacted) => compacted,
            Err(e) => return fail(model, continue_on_error, "Failed to compact JSON", e),
        };
        let account: Account = match serde_json::from_str(&compacted) {
            Ok(account) => account,
            Err(e) => {
                return fail(model, continue_on_error, "Failed to unmarshal JSON", e.to_string())
            }
        };

        let subscription_id = account.id.unwrap_or_default();
        let tenant_id = account.tenant_id.unwrap_or_default();
        crate::log_debug!(self.logger,
            "Azure CLI account succeeded: subscription_id={} tenant_id={}",
            subscription_id, tenant_id
        );

        model.json_result = Some(compacted);
        model.subscription_id = Some(subscription_id);
        model.tenant_id = Some(tenant_id);
        model.success = Some(true);
        encode_result(&model)
    }
}

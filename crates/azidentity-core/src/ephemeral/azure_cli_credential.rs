//! `azidentity_azure_cli_credential`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    credential_option_attributes, open_credential, string_set, tenant_id_attribute,
    token_outcome_attributes, CredentialModel, Fallible, TokenOutcome,
};
use crate::credentials::{parse_timeout, CredentialConfig, CredentialFactory, CredentialKind};
use crate::framework::{Attribute, AttributeKind, EphemeralResource, OpenResponse, Schema};
use crate::logging::{Logger, SharedLogger};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AzureCliCredentialModel {
    tenant_id: Option<String>,
    subscription_id: Option<String>,
    additionally_allowed_tenants: Option<Vec<Option<String>>>,
    claims: Option<String>,
    enable_cae: Option<bool>,
    scopes: Option<Vec<Option<String>>>,
    continue_on_error: Option<bool>,
    timeout: Option<String>,
    #[serde(flatten)]
    outcome: TokenOutcome,
}

impl Fallible for AzureCliCredentialModel {
    fn set_failure(&mut self, error: String) {
        self.outcome.fail(error);
    }
}

impl CredentialModel for AzureCliCredentialModel {
    fn credential_config(&self, logger: &dyn Logger) -> CredentialConfig {
        CredentialConfig {
            tenant_id: self.tenant_id.clone().unwrap_or_default(),
            subscription_id: self.subscription_id.clone().unwrap_or_default(),
            additionally_allowed_tenants: string_set(&self.additionally_allowed_tenants),
            claims: self.claims.clone().unwrap_or_default(),
            enable_cae: self.enable_cae.unwrap_or(false),
            scopes: string_set(&self.scopes),
            continue_on_error: self.continue_on_error.unwrap_or(false),
            timeout: parse_timeout(self.timeout.as_deref(), logger),
            ..Default::default()
        }
    }

    fn outcome_mut(&mut self) -> &mut TokenOutcome {
        &mut self.outcome
    }
}

/// Token from the signed-in Azure CLI session
pub struct AzureCliCredential {
    factory: Arc<dyn CredentialFactory>,
    logger: SharedLogger,
}

impl AzureCliCredential {
    pub fn new(factory: Arc<dyn CredentialFactory>, logger: SharedLogger) -> Self {
        Self { factory, logger }
    }
}

#[async_trait]
impl EphemeralResource for AzureCliCredential {
    fn type_suffix(&self) -> &'static str {
        "_azure_cli_credential"
    }

    fn schema(&self) -> Schema {
        Schema::new("Access token from the identity currently signed in to the Azure CLI (`az login`).")
            .attribute(tenant_id_attribute(false))
            .attribute(
                Attribute::optional("subscription_id", AttributeKind::String)
                    .describe("Subscription name or ID passed to the CLI's --subscription flag when fetching the token."),
            )
            .attributes(credential_option_attributes())
            .attributes(token_outcome_attributes())
    }

    async fn open(&self, config: Value) -> OpenResponse {
        open_credential::<AzureCliCredentialModel>(
            CredentialKind::AzureCliCredential,
            self.factory.as_ref(),
            self.logger.as_ref(),
            &self.schema(),
            config,
        )
        .await
    }
}

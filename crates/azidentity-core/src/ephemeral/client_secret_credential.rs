//! `azidentity_client_secret_credential`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{
    cloud, cloud_attribute, credential_option_attributes, disable_instance_discovery_attribute,
    open_credential, string_set, tenant_id_attribute, token_outcome_attributes, CredentialModel,
    Fallible, TokenOutcome,
};
use crate::credentials::{parse_timeout, CredentialConfig, CredentialFactory, CredentialKind};
use crate::framework::{Attribute, AttributeKind, EphemeralResource, OpenResponse, Schema};
use crate::logging::{Logger, SharedLogger};

#[derive(Default, Serialize, Deserialize)]
struct ClientSecretCredentialModel {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    cloud: Option<String>,
    additionally_allowed_tenants: Option<Vec<Option<String>>>,
    disable_instance_discovery: Option<bool>,
    claims: Option<String>,
    enable_cae: Option<bool>,
    scopes: Option<Vec<Option<String>>>,
    continue_on_error: Option<bool>,
    timeout: Option<String>,
    #[serde(flatten)]
    outcome: TokenOutcome,
}

impl Fallible for ClientSecretCredentialModel {
    fn set_failure(&mut self, error: String) {
        self.outcome.fail(error);
    }
}

impl CredentialModel for ClientSecretCredentialModel {
    fn credential_config(&self, logger: &dyn Logger) -> CredentialConfig {
        CredentialConfig {
            cloud: cloud(&self.cloud),
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            additionally_allowed_tenants: string_set(&self.additionally_allowed_tenants),
            disable_instance_discovery: self.disable_instance_discovery.unwrap_or(false),
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

/// Token for a service principal authenticating with a client secret
pub struct ClientSecretCredential {
    factory: Arc<dyn CredentialFactory>,
    logger: SharedLogger,
}

impl ClientSecretCredential {
    pub fn new(factory: Arc<dyn CredentialFactory>, logger: SharedLogger) -> Self {
        Self { factory, logger }
    }
}

#[async_trait]
impl EphemeralResource for ClientSecretCredential {
    fn type_suffix(&self) -> &'static str {
        "_client_secret_credential"
    }

    fn schema(&self) -> Schema {
        Schema::new("Access token for a service principal authenticating with a client ID and client secret.")
            .attribute(tenant_id_attribute(true))
            .attribute(
                Attribute::required("client_id", AttributeKind::String)
                    .describe("Application ID of the client."),
            )
            .attribute(
                Attribute::required("client_secret", AttributeKind::String)
                    .sensitive()
                    .describe("Client secret of the client."),
            )
            .attribute(cloud_attribute())
            .attribute(disable_instance_discovery_attribute())
            .attributes(credential_option_attributes())
            .attributes(token_outcome_attributes())
    }

    async fn open(&self, config: Value) -> OpenResponse {
        open_credential::<ClientSecretCredentialModel>(
            CredentialKind::ClientSecretCredential,
            self.factory.as_ref(),
            self.logger.as_ref(),
            &self.schema(),
            config,
        )
        .await
    }
}

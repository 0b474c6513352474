//! `azidentity_client_assertion_credential`

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
struct ClientAssertionCredentialModel {
    tenant_id: String,
    client_id: String,
    assertion: String,
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

impl Fallible for ClientAssertionCredentialModel {
    fn set_failure(&mut self, error: String) {
        self.outcome.fail(error);
    }
}

impl CredentialModel for ClientAssertionCredentialModel {
    fn credential_config(&self, logger: &dyn Logger) -> CredentialConfig {
        CredentialConfig {
            cloud: cloud(&self.cloud),
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            assertion: self.assertion.clone(),
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

/// Token for a service principal authenticating with a client assertion
pub struct ClientAssertionCredential {
    factory: Arc<dyn CredentialFactory>,
    logger: SharedLogger,
}

impl ClientAssertionCredential {
    pub fn new(factory: Arc<dyn CredentialFactory>, logger: SharedLogger) -> Self {
        Self { factory, logger }
    }
}

#[async_trait]
impl EphemeralResource for ClientAssertionCredential {
    fn type_suffix(&self) -> &'static str {
        "_client_assertion_credential"
    }

    fn schema(&self) -> Schema {
        Schema::new("Access token for a service principal authenticating with a client ID and a signed client assertion.")
            .attribute(tenant_id_attribute(true))
            .attribute(
                Attribute::required("client_id", AttributeKind::String)
                    .describe("Application ID of the client."),
            )
            .attribute(
                Attribute::required("assertion", AttributeKind::String)
                    .sensitive()
                    .describe("Signed JWT presented as the client assertion, e.g. a federated workload token."),
            )
            .attribute(cloud_attribute())
            .attribute(disable_instance_discovery_attribute())
            .attributes(credential_option_attributes())
            .attributes(token_outcome_attributes())
    }

    async fn open(&self, config: Value) -> OpenResponse {
        open_credential::<ClientAssertionCredentialModel>(
            CredentialKind::ClientAssertionCredential,
            self.factory.as_ref(),
            self.logger.as_ref(),
            &self.schema(),
            config,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{AzureCloud, MockCredentialFactory, MockMode};
    use crate::testing::{memory_logger, token_factory};
    use serde_json::json;

    fn config() -> Value {
        json!({
            "tenant_id": "ze-tenant",
            "client_id": "ze-client",
            "assertion": "ze-assertion",
            "cloud": "AzureGovernment",
            "disable_instance_discovery": true,
            "scopes": ["ze-scope"],
        })
    }

    #[tokio::test]
    async fn test_open_forwards_assertion() {
        let factory = token_factory("ze-token");
        let resource = ClientAssertionCredential::new(factory.clone(), memory_logger());

        let result = resource.open(config()).await.result.unwrap();
        assert_eq!(result["access_token"], "ze-token");
        assert_eq!(result["success"], true);

        let (kind, cfg) = &factory.calls()[0];
        assert_eq!(*kind, CredentialKind::ClientAssertionCredential);
        assert_eq!(cfg.client_id, "ze-client");
        assert_eq!(cfg.assertion, "ze-assertion");
        assert_eq!(cfg.cloud, AzureCloud::AzureGovernment);
        assert!(cfg.disable_instance_discovery);
    }

    #[tokio::test]
    async fn test_open_requires_assertion() {
        let factory = token_factory("ze-token");
        let resource = ClientAssertionCredential::new(factory.clone(), memory_logger());

        let mut cfg = config();
        cfg["assertion"] = Value::Null;
        let response = resource.open(cfg).await;
        assert!(response.diagnostics.has_error());
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_token_failure() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::TokenError(
            "AADSTS700024: Client assertion is not within its valid time range.".to_string(),
        )));
        let resource = ClientAssertionCredential::new(factory, memory_logger());

        let response = resource.open(config()).await;
        assert!(response.result.is_none());
        let diagnostic = response.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Error getting token");
        assert!(diagnostic.detail.starts_with("AADSTS700024"));
    }

    #[tokio::test]
    async fn test_open_creation_failure() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::CreateError(
            "invalid tenant ID ze tenant".to_string(),
        )));
        let resource = ClientAssertionCredential::new(factory, memory_logger());

        let response = resource.open(config()).await;
        assert!(response.result.is_none());
        let diagnostic = response.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Error creating credential");
        assert_eq!(diagnostic.detail, "invalid tenant ID ze tenant");
    }

    #[tokio::test]
    async fn test_open_continue_on_error() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::TokenError(
            "AADSTS90002: Tenant 'ze-tenant' not found.".to_string(),
        )));
        let resource = ClientAssertionCredential::new(factory, memory_logger());

        let mut cfg = config();
        cfg["continue_on_error"] = json!(true);
        let response = resource.open(cfg).await;
        assert!(response.diagnostics.is_empty());
        let result = response.result.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "AADSTS90002: Tenant 'ze-tenant' not found.");
        assert_eq!(result["access_token"], Value::Null);
    }
}

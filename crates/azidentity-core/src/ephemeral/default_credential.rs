//! `azidentity_default_credential`

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
use crate::framework::{EphemeralResource, OpenResponse, Schema};
use crate::logging::{Logger, SharedLogger};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DefaultCredentialModel {
    cloud: Option<String>,
    tenant_id: Option<String>,
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

impl Fallible for DefaultCredentialModel {
    fn set_failure(&mut self, error: String) {
        self.outcome.fail(error);
    }
}

impl CredentialModel for DefaultCredentialModel {
    fn credential_config(&self, logger: &dyn Logger) -> CredentialConfig {
        CredentialConfig {
            cloud: cloud(&self.cloud),
            tenant_id: self.tenant_id.clone().unwrap_or_default(),
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

/// Token from the default credential chain: environment, workload identity, managed
/// identity, then the Azure CLI
pub struct DefaultCredential {
    factory: Arc<dyn CredentialFactory>,
    logger: SharedLogger,
}

impl DefaultCredential {
    pub fn new(factory: Arc<dyn CredentialFactory>, logger: SharedLogger) -> Self {
        Self { factory, logger }
    }
}

#[async_trait]
impl EphemeralResource for DefaultCredential {
    fn type_suffix(&self) -> &'static str {
        "_default_credential"
    }

    fn schema(&self) -> Schema {
        Schema::new("Access token from the default Azure credential chain: environment service principal, workload identity, managed identity, then the Azure CLI.")
            .attribute(cloud_attribute())
            .attribute(tenant_id_attribute(false))
            .attribute(disable_instance_discovery_attribute())
            .attributes(credential_option_attributes())
            .attributes(token_outcome_attributes())
    }

    async fn open(&self, config: Value) -> OpenResponse {
        open_credential::<DefaultCredentialModel>(
            CredentialKind::DefaultCredential,
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
    use std::time::Duration;

    fn config() -> Value {
        json!({
            "tenant_id": "ze-tenant",
            "additionally_allowed_tenants": ["ze-other-tenant"],
            "claims": "ze-claims",
            "enable_cae": true,
            "scopes": ["ze-scope-1", "ze-scope-2"],
        })
    }

    #[tokio::test]
    async fn test_open_success() {
        let factory = token_factory("ze-token");
        let resource = DefaultCredential::new(factory.clone(), memory_logger());

        let response = resource.open(config()).await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let result = response.result.unwrap();
        assert_eq!(result["access_token"], "ze-token");
        assert_eq!(result["expires_on"], "2022-01-02T03:04:05Z");
        assert_eq!(result["success"], true);
        assert_eq!(result["error"], Value::Null);
        assert_eq!(result["tenant_id"], "ze-tenant");
        assert_eq!(result["cloud"], Value::Null);

        let calls = factory.calls();
        assert_eq!(calls.len(), 1);
        let (kind, cfg) = &calls[0];
        assert_eq!(*kind, CredentialKind::DefaultCredential);
        assert_eq!(cfg.cloud, AzureCloud::AzurePublic);
        assert_eq!(cfg.scopes, vec!["ze-scope-1", "ze-scope-2"]);
        assert_eq!(cfg.additionally_allowed_tenants, vec!["ze-other-tenant"]);
        assert_eq!(cfg.claims, "ze-claims");
        assert!(cfg.enable_cae);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_open_creation_failure() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::CreateError(
            "ze-get-credential-fn-error".to_string(),
        )));
        let resource = DefaultCredential::new(factory, memory_logger());

        let response = resource.open(config()).await;
        assert!(response.result.is_none());
        let diagnostic = response.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Error creating credential");
        assert_eq!(diagnostic.detail, "ze-get-credential-fn-error");
    }

    #[tokio::test]
    async fn test_open_token_failure() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::TokenError(
            "ze-get-token-error".to_string(),
        )));
        let resource = DefaultCredential::new(factory, memory_logger());

        let response = resource.open(config()).await;
        let diagnostic = response.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Error getting token");
        assert_eq!(diagnostic.detail, "ze-get-token-error");
    }

    #[tokio::test]
    async fn test_open_continue_on_error() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::TokenError(
            "ze-get-token-error".to_string(),
        )));
        let resource = DefaultCredential::new(factory, memory_logger());

        let mut cfg = config();
        cfg["continue_on_error"] = json!(true);
        let response = resource.open(cfg).await;
        assert!(response.diagnostics.is_empty());
        let result = response.result.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "ze-get-token-error");
        assert_eq!(result["access_token"], Value::Null);
        assert_eq!(result["expires_on"], Value::Null);
    }

    #[tokio::test]
    async fn test_open_timeout() {
        let factory = Arc::new(MockCredentialFactory::new(MockMode::Delay(Duration::from_millis(500))));
        let resource = DefaultCredential::new(factory, memory_logger());

        let mut cfg = config();
        cfg["timeout"] = json!("10ms");
        let response = resource.open(cfg).await;
        let diagnostic = response.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.summary, "Error getting token");
        assert!(diagnostic.detail.contains("context deadline exceeded"));
    }

    #[tokio::test]
    async fn test_open_malformed_timeout_warns() {
        let factory = token_factory("ze-token");
        let logger = memory_logger();
        let resource = DefaultCredential::new(factory.clone(), logger.clone());

        let mut cfg = config();
        cfg["timeout"] = json!("soon");
        let response = resource.open(cfg).await;
        assert!(response.result.is_some());
        assert_eq!(factory.calls()[0].1.timeout, Duration::from_secs(30));
        assert_eq!(logger.messages(crate::logging::LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_open_requires_scopes() {
        let factory = token_factory("ze-token");
        let resource = DefaultCredential::new(factory.clone(), memory_logger());

        let response = resource.open(json!({"tenant_id": "ze-tenant"})).await;
        assert!(response.diagnostics.has_error());
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_cloud() {
        let resource = DefaultCredential::new(token_factory("ze-token"), memory_logger());
        let mut cfg = config();
        cfg["cloud"] = json!("AzureMars");
        let response = resource.open(cfg).await;
        assert_eq!(
            response.diagnostics.iter().next().unwrap().summary,
            "Invalid Attribute Value Match"
        );
    }
}

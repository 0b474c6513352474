//! Azure identity SDK credential factory

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use azure_core::cloud::CloudConfiguration;
use azure_core::credentials::{Secret, TokenCredential};
use azure_core::http::{ClientMethodOptions, ClientOptions};
use azure_identity::{
    AzureCliCredential, AzureCliCredentialOptions, ClientAssertion, ClientAssertionCredential,
    ClientAssertionCredentialOptions, ClientSecretCredential, ClientSecretCredentialOptions,
    ManagedIdentityCredential, ManagedIdentityCredentialOptions, UserAssignedId,
    WorkloadIdentityCredential, WorkloadIdentityCredentialOptions,
};
use chrono::DateTime;

use super::error::{CredentialError, CredentialResult};
use super::traits::{CredentialFactory, TokenSource};
use super::types::{AccessToken, AzureCloud, CredentialConfig, CredentialKind, TokenRequest};
use crate::logging::SharedLogger;

/// The IMDS endpoint managed identity falls back to when no endpoint env var is set
const IMDS_ADDR: &str = "169.254.169.254:80";

/// Without this probe the SDK retries an unreachable IMDS for well over a minute.
const IMDS_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

const CHAIN_NAME: &str = "DefaultAzureCredential";

/// Credential factory backed by `azure_identity`
pub struct AzureCredentialFactory {
    logger: SharedLogger,
}

impl AzureCredentialFactory {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }

    /// Report settings the SDK exposes no knob for, instead of dropping them silently
    fn note_unforwarded(&self, kind: CredentialKind, config: &CredentialConfig) {
        if !config.additionally_allowed_tenants.is_empty() {
            crate::log_warn!(self.logger,
                "{}: additionally_allowed_tenants {:?} ignored, the identity SDK has no allowed-tenants option",
                kind,
                config.additionally_allowed_tenants
            );
        }
        if config.disable_instance_discovery {
            crate::log_debug!(self.logger,
                "{}: disable_instance_discovery is set, the identity SDK performs no instance discovery",
                kind
            );
        }
        if !config.claims.is_empty() || config.enable_cae {
            crate::log_debug!(self.logger,
                "{}: claims/enable_cae are not forwarded by the identity SDK token request",
                kind
            );
        }
    }

    fn azure_cli(&self, config: &CredentialConfig) -> CredentialResult<Arc<dyn TokenCredential>> {
        let options = AzureCliCredentialOptions {
            subscription: non_empty(&config.subscription_id),
            tenant_id: non_empty(&config.tenant_id),
            ..Default::default()
        };
        Ok(AzureCliCredential::new(Some(options))?)
    }

    fn client_secret(&self, config: &CredentialConfig) -> CredentialResult<Arc<dyn TokenCredential>> {
        Ok(ClientSecretCredential::new(
            &config.tenant_id,
            config.client_id.clone(),
            Secret::new(config.client_secret.clone()),
            Some(ClientSecretCredentialOptions {
                client_options: client_options(config.cloud),
            }),
        )?)
    }

    fn client_assertion(&self, config: &CredentialConfig) -> CredentialResult<Arc<dyn TokenCredential>> {
        Ok(ClientAssertionCredential::new(
            config.tenant_id.clone(),
            config.client_id.clone(),
            StaticAssertion(config.assertion.clone()),
            Some(ClientAssertionCredentialOptions {
                client_options: client_options(config.cloud),
            }),
        )?)
    }

    /// Chain mirroring the Go SDK's DefaultAzureCredential
    ///
    /// Order: environment service principal, workload identity, managed identity,
    /// Azure CLI. Members that cannot be constructed are skipped.
    async fn default_chain(&self, config: &CredentialConfig) -> CredentialResult<ChainTokenSource> {
        let mut sources: Vec<(&'static str, Arc<dyn TokenSource>)> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        if let (Ok(tenant_id), Ok(client_id), Ok(client_secret)) = (
            std::env::var("AZURE_TENANT_ID"),
            std::env::var("AZURE_CLIENT_ID"),
            std::env::var("AZURE_CLIENT_SECRET"),
        ) {
            let options = ClientSecretCredentialOptions {
                client_options: client_options(config.cloud),
            };
            match ClientSecretCredential::new(&tenant_id, client_id, Secret::new(client_secret), Some(options)) {
                Ok(cred) => sources.push(("EnvironmentCredential", sdk_source(cred))),
                Err(e) => errors.push(format!("EnvironmentCredential: {}", e)),
            }
        }

        let workload_options = WorkloadIdentityCredentialOptions {
            credential_options: ClientAssertionCredentialOptions {
                client_options: client_options(config.cloud),
            },
            tenant_id: non_empty(&config.tenant_id),
            ..Default::default()
        };
        match WorkloadIdentityCredential::new(Some(workload_options)) {
            Ok(cred) => sources.push(("WorkloadIdentityCredential", sdk_source(cred))),
            Err(e) => errors.push(format!("WorkloadIdentityCredential: {}", e)),
        }

        if has_managed_identity_env_vars() || imds_is_reachable().await {
            let options = ManagedIdentityCredentialOptions {
                user_assigned_id: std::env::var("AZURE_CLIENT_ID").ok().map(UserAssignedId::ClientId),
                client_options: client_options(config.cloud),
                ..Default::default()
            };
            match ManagedIdentityCredential::new(Some(options)) {
                Ok(cred) => sources.push(("ManagedIdentityCredential", sdk_source(cred))),
                Err(e) => errors.push(format!("ManagedIdentityCredential: {}", e)),
            }
        } else {
            errors.push("ManagedIdentityCredential: IMDS not reachable (probe timed out)".to_string());
        }

        match self.azure_cli(config) {
            Ok(cred) => sources.push(("AzureCliCredential", sdk_source(cred))),
            Err(e) => errors.push(format!("AzureCliCredential: {}", e)),
        }

        if sources.is_empty() {
            return Err(CredentialError::ChainFailed {
                name: CHAIN_NAME.to_string(),
                errors,
            });
        }
        if !errors.is_empty() {
            crate::log_debug!(self.logger,
                "{}: some credentials could not be constructed:\n{}",
                CHAIN_NAME,
                errors.join("\n")
            );
        }

        Ok(ChainTokenSource {
            sources,
            logger: Arc::clone(&self.logger),
        })
    }
}

#[async_trait]
impl CredentialFactory for AzureCredentialFactory {
    async fn create(
        &self,
        kind: CredentialKind,
        config: &CredentialConfig,
    ) -> CredentialResult<Arc<dyn TokenSource>> {
        self.note_unforwarded(kind, config);
        crate::log_debug!(self.logger, "creating {} with {:?}", kind, config);

        match kind {
            CredentialKind::DefaultCredential => Ok(Arc::new(self.default_chain(config).await?)),
            CredentialKind::AzureCliCredential => Ok(sdk_source(self.azure_cli(config)?)),
            CredentialKind::ClientSecretCredential => Ok(sdk_source(self.client_secret(config)?)),
            CredentialKind::ClientAssertionCredential => {
                Ok(sdk_source(self.client_assertion(config)?))
            }
        }
    }
}

fn cloud_configuration(cloud: AzureCloud) -> CloudConfiguration {
    match cloud {
        AzureCloud::AzurePublic => CloudConfiguration::AzurePublic,
        AzureCloud::AzureChina => CloudConfiguration::AzureChina,
        AzureCloud::AzureGovernment => CloudConfiguration::AzureGovernment,
    }
}

/// Pipeline options pinning the credential to the authority of `cloud`
fn client_options(cloud: AzureCloud) -> ClientOptions {
    ClientOptions {
        cloud: Some(Arc::new(cloud_configuration(cloud))),
        ..Default::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn has_managed_identity_env_vars() -> bool {
    std::env::var_os("IDENTITY_ENDPOINT").is_some() || std::env::var_os("MSI_ENDPOINT").is_some()
}

async fn imds_is_reachable() -> bool {
    tokio::time::timeout(IMDS_PROBE_TIMEOUT, tokio::net::TcpStream::connect(IMDS_ADDR))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}

/// Client assertion that always returns the configured string
struct StaticAssertion(String);

impl fmt::Debug for StaticAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticAssertion(<redacted>)")
    }
}

#[async_trait]
impl ClientAssertion for StaticAssertion {
    async fn secret(&self, _options: Option<ClientMethodOptions<'_>>) -> azure_core::Result<String> {
        Ok(self.0.clone())
    }
}

fn sdk_source(credential: Arc<dyn TokenCredential>) -> Arc<dyn TokenSource> {
    Arc::new(SdkTokenSource { credential })
}

/// Adapts an SDK `TokenCredential` to [`TokenSource`]
struct SdkTokenSource {
    credential: Arc<dyn TokenCredential>,
}

#[async_trait]
impl TokenSource for SdkTokenSource {
    async fn get_token(&self, request: &TokenRequest) -> CredentialResult<AccessToken> {
        let scopes = request.scope_refs();
        let token = self.credential.get_token(&scopes, None).await?;
        let expires_on = DateTime::from_timestamp(token.expires_on.unix_timestamp(), 0)
            .ok_or_else(|| CredentialError::other("token expiry is out of range"))?;
        Ok(AccessToken::new(token.token.secret(), expires_on))
    }
}

/// Tries each member in order and returns the first token
struct ChainTokenSource {
    sources: Vec<(&'static str, Arc<dyn TokenSource>)>,
    logger: SharedLogger,
}

#[async_trait]
impl TokenSource for ChainTokenSource {
    async fn get_token(&self, request: &TokenRequest) -> CredentialResult<AccessToken> {
        let mut errors = Vec::new();
        for (name, source) in &self.sources {
            match source.get_token(request).await {
                Ok(token) => {
                    crate::log_debug!(self.logger, "{}: authenticated with {}", CHAIN_NAME, name);
                    return Ok(token);
                }
                Err(e) => {
                    crate::log_debug!(self.logger, "{}: {} failed: {}", CHAIN_NAME, name, e);
                    errors.push(format!("{}: {}", name, e));
                }
            }
        }

        Err(CredentialError::ChainFailed {
            name: CHAIN_NAME.to_string(),
            errors,
        })
    }
}

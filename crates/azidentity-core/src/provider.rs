//! The `azidentity` provider: resource and function registry plus request routing

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::credentials::{AzureCredentialFactory, CredentialFactory};
use crate::ephemeral::{
    AzureCliAccount, AzureCliCredential, ClientAssertionCredential, ClientSecretCredential,
    DefaultCredential, EnvironmentVariable, HttpRequestResource,
};
use crate::exec::{CommandRunner, TokioCommandRunner};
use crate::framework::{Diagnostics, EphemeralResource, Function, FunctionDefinition, OpenResponse, Schema};
use crate::functions::UnsafeParseJwt;
use crate::http::{HttpClient, HttpResult, ReqwestHttpClient};
use crate::logging::{ConsoleLogger, SharedLogger};

pub const TYPE_NAME: &str = "azidentity";

/// Provider-level description returned to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
    pub ephemeral_resources: Vec<String>,
    pub functions: Vec<&'static str>,
}

pub struct AzidentityProvider {
    version: String,
    resources: Vec<Arc<dyn EphemeralResource>>,
    functions: Vec<Arc<dyn Function>>,
    logger: SharedLogger,
}

impl AzidentityProvider {
    pub fn builder() -> ProviderBuilder {
        ProviderBuilder::new()
    }

    pub fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: TYPE_NAME,
            version: self.version.clone(),
            ephemeral_resources: self.resources.iter().map(|r| full_type_name(r.type_suffix())).collect(),
            functions: self.functions.iter().map(|f| f.name()).collect(),
        }
    }

    fn resource(&self, type_name: &str) -> Option<&Arc<dyn EphemeralResource>> {
        self.resources
            .iter()
            .find(|r| full_type_name(r.type_suffix()) == type_name)
    }

    fn function(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn resource_schema(&self, type_name: &str) -> Result<Schema, Diagnostics> {
        self.resource(type_name)
            .map(|r| r.schema())
            .ok_or_else(|| unknown_resource(type_name))
    }

    pub fn function_definition(&self, name: &str) -> Result<FunctionDefinition, Diagnostics> {
        self.function(name)
            .map(|f| f.definition())
            .ok_or_else(|| unknown_function(name))
    }

    /// Open the ephemeral resource named `type_name`
    pub async fn open(&self, type_name: &str, config: Value) -> OpenResponse {
        match self.resource(type_name) {
            Some(resource) => {
                crate::log_debug!(self.logger, "opening {}", type_name);
                resource.open(config).await
            }
            None => OpenResponse::from_diagnostics(unknown_resource(type_name)),
        }
    }

    /// Call the function named `name`; failures become a single error diagnostic
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, Diagnostics> {
        let function = self.function(name).ok_or_else(|| unknown_function(name))?;
        function.run(args).await.map_err(|e| {
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_error(format!("Error calling function {}", name), e.to_string());
            diagnostics
        })
    }
}

fn full_type_name(type_suffix: &str) -> String {
    format!("{}{}", TYPE_NAME, type_suffix)
}

fn unknown_resource(type_name: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    diagnostics.add_error(
        "Unknown ephemeral resource type",
        format!("The provider {} has no ephemeral resource named {:?}.", TYPE_NAME, type_name),
    );
    diagnostics
}

fn unknown_function(name: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    diagnostics.add_error(
        "Unknown function",
        format!("The provider {} has no function named {:?}.", TYPE_NAME, name),
    );
    diagnostics
}

/// Builds an [`AzidentityProvider`] with production collaborators unless overridden
///
/// ```no_run
/// use azidentity_core::{AzidentityProvider, Settings};
///
/// let provider = AzidentityProvider::builder()
///     .settings(Settings::default().with_debug(true))
///     .build()
///     .expect("http client");
/// assert_eq!(provider.type_name(), "azidentity");
/// ```
#[derive(Default)]
pub struct ProviderBuilder {
    settings: Settings,
    version: Option<String>,
    credential_factory: Option<Arc<dyn CredentialFactory>>,
    command_runner: Option<Arc<dyn CommandRunner>>,
    http_client: Option<Arc<dyn HttpClient>>,
    logger: Option<SharedLogger>,
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn credential_factory(mut self, factory: Arc<dyn CredentialFactory>) -> Self {
        self.credential_factory = Some(factory);
        self
    }

    pub fn command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.command_runner = Some(runner);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> HttpResult<AzidentityProvider> {
        let logger: SharedLogger = match self.logger {
            Some(logger) => logger,
            None => Arc::new(ConsoleLogger::new().with_min_level(self.settings.log_level)),
        };
        let credential_factory: Arc<dyn CredentialFactory> = match self.credential_factory {
            Some(factory) => factory,
            None => Arc::new(AzureCredentialFactory::new(Arc::clone(&logger))),
        };
        let command_runner: Arc<dyn CommandRunner> = match self.command_runner {
            Some(runner) => runner,
            None => Arc::new(TokioCommandRunner::new()),
        };
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new(&self.settings.user_agent)?),
        };

        let resources: Vec<Arc<dyn EphemeralResource>> = vec![
            Arc::new(DefaultCredential::new(Arc::clone(&credential_factory), Arc::clone(&logger))),
            Arc::new(AzureCliCredential::new(Arc::clone(&credential_factory), Arc::clone(&logger))),
            Arc::new(ClientSecretCredential::new(Arc::clone(&credential_factory), Arc::clone(&logger))),
            Arc::new(ClientAssertionCredential::new(credential_factory, Arc::clone(&logger))),
            Arc::new(EnvironmentVariable::new()),
            Arc::new(HttpRequestResource::new(http_client, Arc::clone(&logger))),
            Arc::new(AzureCliAccount::new(command_runner, Arc::clone(&logger))),
        ];
        let functions: Vec<Arc<dyn Function>> = vec![Arc::new(UnsafeParseJwt::new())];

        Ok(AzidentityProvider {
            version: self.version.unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            resources,
            functions,
            logger,
        })
    }
}

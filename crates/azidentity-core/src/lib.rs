//! azidentity core
//!
//! Short-lived Azure access tokens and a few auxiliary values, exposed as ephemeral
//! resources of an infrastructure-as-code host. Token acquisition is delegated to the
//! Azure identity SDK through a [`CredentialFactory`]; everything else here is schema
//! declaration, configuration plumbing and mapping failures onto host diagnostics.
//!
//! ```rust,ignore
//! use azidentity_core::AzidentityProvider;
//! use serde_json::json;
//!
//! let provider = AzidentityProvider::builder().build()?;
//! let response = provider
//!     .open("azidentity_azure_cli_credential", json!({
//!         "scopes": ["https://management.azure.com/.default"],
//!     }))
//!     .await;
//! ```

pub mod logging;
pub mod config;
pub mod credentials;
pub mod framework;
pub mod exec;
pub mod http;
pub mod ephemeral;
pub mod functions;
pub mod provider;

#[cfg(test)]
mod testing;

pub use logging::{ConsoleLogger, Logger, LogLevel, MemoryLogger, NoOpLogger, SharedLogger};

pub use config::{Settings, SettingsError, SettingsResult};

pub use credentials::{
    get_token, AccessToken, AzureCloud, AzureCredentialFactory, CredentialConfig,
    CredentialError, CredentialFactory, CredentialKind, MockCredentialFactory, MockMode,
    TokenError, TokenSource,
};

pub use framework::{
    Diagnostic, Diagnostics, EphemeralResource, Function, FunctionError, OpenResponse, Schema,
    Severity,
};

pub use exec::{CommandOutput, CommandRunner, CommandSpec, ExecError, TokioCommandRunner};

pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use provider::{AzidentityProvider, ProviderBuilder, ProviderMetadata};

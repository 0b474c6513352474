//! Ephemeral resources
//!
//! Four credential resources share one dispatch path (validate, decode, fetch a token,
//! encode). The rest wrap an environment lookup, an HTTP call and an `az` subprocess.

mod common;
mod default_credential;
mod azure_cli_credential;
mod client_secret_credential;
mod client_assertion_credential;
mod environment_variable;
mod http_request;
mod azure_cli_account;

pub use default_credential::DefaultCredential;
pub use azure_cli_credential::AzureCliCredential;
pub use client_secret_credential::ClientSecretCredential;
pub use client_assertion_credential::ClientAssertionCredential;
pub use environment_variable::EnvironmentVariable;
pub use http_request::HttpRequestResource;
pub use azure_cli_account::AzureCliAccount;

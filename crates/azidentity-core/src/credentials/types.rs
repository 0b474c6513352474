//! Configuration record and token types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use super::timeout::DEFAULT_TIMEOUT;

/// The supported Azure authentication strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    DefaultCredential,
    AzureCliCredential,
    ClientSecretCredential,
    ClientAssertionCredential,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::DefaultCredential => "DefaultCredential",
            CredentialKind::AzureCliCredential => "AzureCLICredential",
            CredentialKind::ClientSecretCredential => "ClientSecretCredential",
            CredentialKind::ClientAssertionCredential => "ClientAssertionCredential",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sovereign cloud selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AzureCloud {
    #[default]
    AzurePublic,
    AzureChina,
    AzureGovernment,
}

impl AzureCloud {
    /// Accepted values of the `cloud` attribute
    pub const NAMES: [&'static str; 3] = ["AzurePublic", "AzureChina", "AzureGovernment"];

    /// Map the `cloud` attribute to a cloud; anything unknown or absent is public
    pub fn from_attribute(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AzureCloud::AzurePublic => "AzurePublic",
            AzureCloud::AzureChina => "AzureChina",
            AzureCloud::AzureGovernment => "AzureGovernment",
        }
    }
}

impl FromStr for AzureCloud {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AzurePublic" => Ok(AzureCloud::AzurePublic),
            "AzureChina" => Ok(AzureCloud::AzureChina),
            "AzureGovernment" => Ok(AzureCloud::AzureGovernment),
            other => Err(format!("unknown cloud: {}", other)),
        }
    }
}

/// Flat configuration record handed to the credential factory
///
/// Built fresh per request from the resource configuration and discarded once the
/// token call returns.
#[derive(Clone)]
pub struct CredentialConfig {
    pub cloud: AzureCloud,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub assertion: String,
    pub subscription_id: String,
    pub additionally_allowed_tenants: Vec<String>,
    pub disable_instance_discovery: bool,
    pub claims: String,
    pub enable_cae: bool,
    pub scopes: Vec<String>,
    pub continue_on_error: bool,
    pub timeout: Duration,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            cloud: AzureCloud::default(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            assertion: String::new(),
            subscription_id: String::new(),
            additionally_allowed_tenants: Vec::new(),
            disable_instance_discovery: false,
            claims: String::new(),
            enable_cae: false,
            scopes: Vec::new(),
            continue_on_error: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CredentialConfig {
    /// Token request options derived from this record
    pub fn token_request(&self) -> TokenRequest {
        TokenRequest {
            scopes: self.scopes.clone(),
            claims: self.claims.clone(),
            enable_cae: self.enable_cae,
            tenant_id: self.tenant_id.clone(),
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("cloud", &self.cloud)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("assertion", &redact(&self.assertion))
            .field("subscription_id", &self.subscription_id)
            .field("additionally_allowed_tenants", &self.additionally_allowed_tenants)
            .field("disable_instance_discovery", &self.disable_instance_discovery)
            .field("claims", &self.claims)
            .field("enable_cae", &self.enable_cae)
            .field("scopes", &self.scopes)
            .field("continue_on_error", &self.continue_on_error)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Options for a single token fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub scopes: Vec<String>,
    pub claims: String,
    pub enable_cae: bool,
    pub tenant_id: String,
}

impl TokenRequest {
    pub fn scope_refs(&self) -> Vec<&str> {
        self.scopes.iter().map(String::as_str).collect()
    }
}

/// An issued access token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Expiry in RFC3339 with second precision, e.g. `2022-01-02T03:04:05Z`
    pub fn expires_on_rfc3339(&self) -> String {
        self.expires_on.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &redact(&self.token))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

//! Plumbing shared by the ephemeral resources

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credentials::{get_token, AccessToken, AzureCloud, CredentialConfig, CredentialFactory, CredentialKind};
use crate::framework::{decode_config, encode_result, Attribute, AttributeKind, OpenResponse, Schema};
use crate::logging::Logger;

pub(crate) const TIMEOUT_DESCRIPTION: &str = "Maximum time allowed for the request to complete: a possibly signed sequence of decimal numbers, each with optional fraction and a unit suffix, such as '300ms', '1.5h' or '2h45m'. Valid time units are 'ns', 'us' (or 'µs'), 'ms', 's', 'm', 'h'. Defaults to '30s'.";

/// A resource model that can record a swallowed failure
pub(crate) trait Fallible: Serialize {
    fn set_failure(&mut self, error: String);
}

/// Turn a failure into the open response
///
/// With `continue_on_error` the model is returned with `success=false` and the message;
/// otherwise the failure becomes a single error diagnostic and no result.
pub(crate) fn fail<M: Fallible>(
    mut model: M,
    continue_on_error: bool,
    summary: &str,
    message: String,
) -> OpenResponse {
    if continue_on_error {
        model.set_failure(message);
        encode_result(&model)
    } else {
        OpenResponse::error(summary, message)
    }
}

/// Set-of-string attribute values, dropping null elements
pub(crate) fn string_set(values: &Option<Vec<Option<String>>>) -> Vec<String> {
    values
        .iter()
        .flatten()
        .filter_map(|v| v.clone())
        .collect()
}

/// Computed outputs of every credential resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TokenOutcome {
    pub access_token: Option<String>,
    pub expires_on: Option<String>,
    pub success: Option<bool>,
    pub error: Option<String>,
}

impl TokenOutcome {
    fn succeed(&mut self, token: &AccessToken) {
        self.access_token = Some(token.token.clone());
        self.expires_on = Some(token.expires_on_rfc3339());
        self.success = Some(true);
    }

    pub fn fail(&mut self, error: String) {
        self.success = Some(false);
        self.error = Some(error);
    }
}

/// Configuration model of a credential resource
pub(crate) trait CredentialModel: Fallible + DeserializeOwned + Send {
    fn credential_config(&self, logger: &dyn Logger) -> CredentialConfig;

    fn outcome_mut(&mut self) -> &mut TokenOutcome;
}

/// Validate, decode, fetch a token and encode the result
pub(crate) async fn open_credential<M: CredentialModel>(
    kind: CredentialKind,
    factory: &dyn CredentialFactory,
    logger: &dyn Logger,
    schema: &Schema,
    config: Value,
) -> OpenResponse {
    let diagnostics = schema.validate(&config);
    if diagnostics.has_error() {
        return OpenResponse::from_diagnostics(diagnostics);
    }
    let mut model: M = match decode_config(config) {
        Ok(model) => model,
        Err(diagnostics) => return OpenResponse::from_diagnostics(diagnostics),
    };

    let credential_config = model.credential_config(logger);
    let continue_on_error = credential_config.continue_on_error;
    match get_token(kind, factory, credential_config).await {
        Ok(token) => {
            crate::log_debug!(logger, "{}: token acquired, expires_on={}", kind, token.expires_on_rfc3339());
            model.outcome_mut().succeed(&token);
            encode_result(&model)
        }
        Err(e) => {
            crate::log_debug!(logger, "{}: {}: {}", kind, e.summary(), e);
            fail(model, continue_on_error, e.summary(), e.to_string())
        }
    }
}

pub(crate) fn cloud(value: &Option<String>) -> AzureCloud {
    AzureCloud::from_attribute(value.as_deref())
}

// Attributes shared by the credential resources

pub(crate) fn cloud_attribute() -> Attribute {
    Attribute::optional("cloud", AttributeKind::String)
        .describe("Cloud to authenticate against. The default is AzurePublic.")
        .one_of(&AzureCloud::NAMES)
}

pub(crate) fn tenant_id_attribute(required: bool) -> Attribute {
    let attribute = if required {
        Attribute::required("tenant_id", AttributeKind::String)
    } else {
        Attribute::optional("tenant_id", AttributeKind::String)
    };
    attribute.describe("Default tenant for authentication. Use 'organizations' or 'common' when a tenant is required but unknown.")
}

pub(crate) fn credential_option_attributes() -> Vec<Attribute> {
    vec![
        Attribute::optional("additionally_allowed_tenants", AttributeKind::StringSet)
            .describe("Tenants the credential may authenticate to in addition to tenant_id. '*' allows any tenant."),
        Attribute::optional("claims", AttributeKind::String)
            .describe("Additional claims required by a conditional access policy, already base64-decoded."),
        Attribute::optional("enable_cae", AttributeKind::Bool)
            .describe("Request a Continuous Access Evaluation token. The default is false."),
        Attribute::required("scopes", AttributeKind::StringSet)
            .describe("Permission scopes required for the token, e.g. https://management.azure.com/.default."),
        Attribute::optional("continue_on_error", AttributeKind::Bool)
            .describe("Report a failure through success/error instead of failing. The default is false."),
        Attribute::optional("timeout", AttributeKind::String).describe(TIMEOUT_DESCRIPTION),
    ]
}

pub(crate) fn disable_instance_discovery_attribute() -> Attribute {
    Attribute::optional("disable_instance_discovery", AttributeKind::Bool)
        .describe("Skip the Microsoft Entra instance metadata request. Only for disconnected or private clouds. The default is false.")
}

pub(crate) fn token_outcome_attributes() -> Vec<Attribute> {
    vec![
        Attribute::computed("access_token", AttributeKind::String)
            .sensitive()
            .describe("The issued access token."),
        Attribute::computed("expires_on", AttributeKind::String)
            .describe("When the issued access token expires, in RFC3339 format."),
        Attribute::computed("success", AttributeKind::Bool)
            .describe("Whether a token was acquired."),
        Attribute::computed("error", AttributeKind::String)
            .describe("Error message when acquiring a token failed."),
    ]
}

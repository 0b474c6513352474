//! Credential collaborator traits

use std::sync::Arc;

use async_trait::async_trait;

use super::error::CredentialResult;
use super::types::{AccessToken, CredentialConfig, CredentialKind, TokenRequest};

/// Something that can hand out access tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch one token for the requested scopes
    async fn get_token(&self, request: &TokenRequest) -> CredentialResult<AccessToken>;
}

/// Builds a token source for a credential type
///
/// The production implementation wraps the Azure identity SDK. It is injected
/// through the provider constructor so tests can substitute it.
#[async_trait]
pub trait CredentialFactory: Send + Sync {
    async fn create(
        &self,
        kind: CredentialKind,
        config: &CredentialConfig,
    ) -> CredentialResult<Arc<dyn TokenSource>>;
}

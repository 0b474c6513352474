//! Mock credential factory for testing
//!
//! Provides deterministic tokens and failures without touching Azure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use super::error::{CredentialError, CredentialResult};
use super::traits::{CredentialFactory, TokenSource};
use super::types::{AccessToken, CredentialConfig, CredentialKind, TokenRequest};

/// Mock behaviour
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Hand out the given token
    Token(AccessToken),
    /// Fail while building the credential
    CreateError(String),
    /// Build the credential, then fail every token fetch
    TokenError(String),
    /// Sleep before answering; pair with a short timeout to exercise cancellation
    Delay(Duration),
}

/// Expiry used by the fixed-token helpers
pub fn fixed_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5)
        .single()
        .unwrap_or_default()
}

/// Credential factory that answers from a [`MockMode`]
#[derive(Debug)]
pub struct MockCredentialFactory {
    mode: MockMode,
    calls: Mutex<Vec<(CredentialKind, CredentialConfig)>>,
}

impl MockCredentialFactory {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Factory whose credentials always return `token`, expiring 2022-01-02T03:04:05Z
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::new(MockMode::Token(AccessToken::new(token, fixed_expiry())))
    }

    /// Every (kind, config) pair the factory was asked to build
    pub fn calls(&self) -> Vec<(CredentialKind, CredentialConfig)> {
        self.calls.lock().clone()
    }
}

struct MockTokenSource {
    mode: MockMode,
}

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn get_token(&self, _request: &TokenRequest) -> CredentialResult<AccessToken> {
        match &self.mode {
            MockMode::Token(token) => Ok(token.clone()),
            MockMode::TokenError(message) => Err(CredentialError::other(message.clone())),
            MockMode::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(AccessToken::new("delayed-token", fixed_expiry()))
            }
            MockMode::CreateError(message) => Err(CredentialError::other(message.clone())),
        }
    }
}

#[async_trait]
impl CredentialFactory for MockCredentialFactory {
    async fn create(
        &self,
        kind: CredentialKind,
        config: &CredentialConfig,
    ) -> CredentialResult<Arc<dyn TokenSource>> {
        self.calls.lock().push((kind, config.clone()));

        if let MockMode::CreateError(message) = &self.mode {
            return Err(CredentialError::other(message.clone()));
        }

        Ok(Arc::new(MockTokenSource {
            mode: self.mode.clone(),
        }))
    }
}

//! Timeout-bounded token acquisition

use super::error::{CredentialError, TokenError, TokenStage};
use super::traits::CredentialFactory;
use super::types::{AccessToken, CredentialConfig, CredentialKind};

/// Build a credential of the given kind and fetch one token with it
///
/// The token fetch is cancelled once `config.timeout` elapses. Failures are returned
/// unchanged, tagged with the stage they happened in; whether to surface or swallow
/// them is the caller's decision.
pub async fn get_token(
    kind: CredentialKind,
    factory: &dyn CredentialFactory,
    config: CredentialConfig,
) -> Result<AccessToken, TokenError> {
    let credential = factory
        .create(kind, &config)
        .await
        .map_err(|e| TokenError::new(TokenStage::CreatingCredential, e))?;

    let request = config.token_request();
    match tokio::time::timeout(config.timeout, credential.get_token(&request)).await {
        Ok(Ok(token)) => Ok(token),
        Ok(Err(e)) => Err(TokenError::new(TokenStage::GettingToken, e)),
        Err(_) => Err(TokenError::new(
            TokenStage::GettingToken,
            CredentialError::DeadlineExceeded(config.timeout),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{MockCredentialFactory, MockMode};
    use std::time::Duration;

    fn config() -> CredentialConfig {
        CredentialConfig {
            scopes: vec!["ze-scope-1".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_token_success() {
        let factory = MockCredentialFactory::fixed("ze-token");
        let token = get_token(CredentialKind::DefaultCredential, &factory, config())
            .await
            .unwrap();
        assert_eq!(token.token, "ze-token");
        assert_eq!(token.expires_on_rfc3339(), "2022-01-02T03:04:05Z");
    }

    #[tokio::test]
    async fn test_get_token_creation_failure_stage() {
        let factory = MockCredentialFactory::new(MockMode::CreateError(
            "ze-get-credential-fn-error".to_string(),
        ));
        let err = get_token(CredentialKind::ClientSecretCredential, &factory, config())
            .await
            .unwrap_err();
        assert_eq!(err.stage, TokenStage::CreatingCredential);
        assert_eq!(err.summary(), "Error creating credential");
        assert_eq!(err.to_string(), "ze-get-credential-fn-error");
    }

    #[tokio::test]
    async fn test_get_token_fetch_failure_stage() {
        let factory = MockCredentialFactory::new(MockMode::TokenError("ze-get-token-error".to_string()));
        let err = get_token(CredentialKind::AzureCliCredential, &factory, config())
            .await
            .unwrap_err();
        assert_eq!(err.stage, TokenStage::GettingToken);
        assert_eq!(err.summary(), "Error getting token");
        assert_eq!(err.to_string(), "ze-get-token-error");
    }

    #[tokio::test]
    async fn test_get_token_times_out() {
        let factory = MockCredentialFactory::new(MockMode::Delay(Duration::from_millis(200)));
        let cfg = CredentialConfig {
            timeout: Duration::from_millis(10),
            ..config()
        };
        let err = get_token(CredentialKind::DefaultCredential, &factory, cfg)
            .await
            .unwrap_err();
        assert_eq!(err.stage, TokenStage::GettingToken);
        assert!(err.to_string().contains("context deadline exceeded"));
    }

    #[tokio::test]
    async fn test_get_token_passes_kind_and_config() {
        let factory = MockCredentialFactory::fixed("ze-token");
        let cfg = CredentialConfig {
            tenant_id: "ze-tenant".to_string(),
            ..config()
        };
        get_token(CredentialKind::ClientAssertionCredential, &factory, cfg)
            .await
            .unwrap();

        let calls = factory.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, CredentialKind::ClientAssertionCredential);
        assert_eq!(calls[0].1.tenant_id, "ze-tenant");
    }
}

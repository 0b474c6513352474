//! Credential error types

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while building a credential or fetching a token
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Error reported by the Azure identity SDK
    #[error("{0}")]
    Azure(#[from] azure_core::Error),

    /// The token fetch did not finish within the configured timeout
    #[error("context deadline exceeded (timeout {0:?})")]
    DeadlineExceeded(Duration),

    /// Every member of a credential chain failed
    #[error("{name}: all credentials failed:\n{}", .errors.join("\n"))]
    ChainFailed { name: String, errors: Vec<String> },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CredentialError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Which step of token acquisition failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStage {
    CreatingCredential,
    GettingToken,
}

impl TokenStage {
    /// Human-readable label used as the diagnostic summary
    pub fn summary(&self) -> &'static str {
        match self {
            TokenStage::CreatingCredential => "Error creating credential",
            TokenStage::GettingToken => "Error getting token",
        }
    }
}

impl fmt::Display for TokenStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

/// A dispatch failure paired with the stage it happened in
///
/// Displays as the underlying error only; the stage is carried separately so the
/// caller decides whether to surface it as a diagnostic summary.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct TokenError {
    pub stage: TokenStage,
    #[source]
    pub source: CredentialError,
}

impl TokenError {
    pub fn new(stage: TokenStage, source: CredentialError) -> Self {
        Self { stage, source }
    }

    pub fn summary(&self) -> &'static str {
        self.stage.summary()
    }
}

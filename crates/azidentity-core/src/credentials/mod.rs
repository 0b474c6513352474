//! Credential dispatch
//!
//! Every credential-backed ephemeral resource funnels into [`get_token`]: it asks a
//! [`CredentialFactory`] for a token source, then fetches one token bounded by the
//! configured timeout. The Azure SDK lives behind [`AzureCredentialFactory`]; tests and
//! smoke runs swap in [`MockCredentialFactory`].

mod types;
mod error;
mod traits;
mod timeout;
mod dispatch;
mod azure;
mod mock;

pub use types::{AccessToken, AzureCloud, CredentialConfig, CredentialKind, TokenRequest};
pub use error::{CredentialError, CredentialResult, TokenError, TokenStage};
pub use traits::{CredentialFactory, TokenSource};
pub use timeout::{parse_go_duration, parse_timeout, DurationError, DEFAULT_TIMEOUT};
pub use dispatch::get_token;
pub use azure::AzureCredentialFactory;
pub use mock::{fixed_expiry, MockCredentialFactory, MockMode};

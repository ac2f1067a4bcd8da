//! Credential actions forwarded to the external identity provider.
//!
//! The provider owns registration, password policy, token issuance and
//! confirmation codes. This module only shapes parameters, logs failures and
//! hands provider errors back unchanged.

mod http;
mod types;

pub use http::HttpIdentityProvider;
pub use types::{
    ProviderError, SessionTokens, SignInOutput, SignInStep, SignUpOutput, SignUpStep,
};

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<SignUpOutput, ProviderError>;

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &SecretString,
    ) -> Result<bool, ProviderError>;

    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SignInOutput, ProviderError>;

    /// Invalidate the session everywhere (global sign out).
    async fn sign_out(&self, access_token: Option<&SecretString>) -> Result<(), ProviderError>;
}

/// Thin façade the HTTP handlers call instead of the provider directly.
#[derive(Clone)]
pub struct CredentialActions {
    provider: Arc<dyn IdentityProvider>,
}

impl CredentialActions {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// # Errors
    /// Returns the provider error unchanged.
    #[instrument(skip_all)]
    pub async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<SignUpOutput, ProviderError> {
        debug!("sign up requested for {username}");
        match self.provider.sign_up(username, password, email).await {
            Ok(output) => {
                debug!(
                    "sign up complete: {}, next step: {:?}",
                    output.is_sign_up_complete, output.next_step
                );
                Ok(output)
            }
            Err(err) => {
                error!("Error signing up: {err}");
                Err(err)
            }
        }
    }

    /// # Errors
    /// Returns the provider error unchanged.
    #[instrument(skip_all)]
    pub async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &SecretString,
    ) -> Result<bool, ProviderError> {
        self.provider
            .confirm_sign_up(username, confirmation_code)
            .await
            .inspect_err(|err| error!("Error confirming sign up: {err}"))
    }

    /// # Errors
    /// Returns the provider error unchanged.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SignInOutput, ProviderError> {
        self.provider
            .sign_in(username, password)
            .await
            .inspect_err(|err| error!("Error signing in: {err}"))
    }

    /// # Errors
    /// Returns the provider error unchanged.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: Option<&SecretString>) -> Result<(), ProviderError> {
        self.provider
            .sign_out(access_token)
            .await
            .inspect_err(|err| error!("Error signing out: {err}"))
    }
}

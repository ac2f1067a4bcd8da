//! Identity provider contract types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid identity provider response: {0}")]
    Decode(String),
}

/// Next action required after a sign-up attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignUpStep {
    ConfirmSignUp,
    CompleteAutoSignIn,
    Done,
}

/// Next action required after a sign-in attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignInStep {
    ConfirmSignInWithSmsCode,
    ConfirmSignInWithTotpCode,
    ConfirmSignInWithEmailCode,
    ConfirmSignInWithCustomChallenge,
    ConfirmSignInWithNewPasswordRequired,
    ContinueSignInWithMfaSelection,
    ContinueSignInWithTotpSetup,
    ConfirmSignUp,
    ResetPassword,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignUpOutput {
    pub is_sign_up_complete: bool,
    pub next_step: SignUpStep,
}

/// Tokens issued on a completed sign in.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: SecretString,
    pub id_token: SecretString,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub next_step: SignInStep,
    pub tokens: Option<SessionTokens>,
}

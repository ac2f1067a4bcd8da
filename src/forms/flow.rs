//! Sign-up / confirm / sign-in form state.
//!
//! One `AuthFlow` value per form instance; transitions are driven by the
//! outcome of each credential action.

use crate::gate::{HOME_PATH, SIGN_IN_PATH};
use crate::identity::{SignInOutput, SignInStep, SignUpOutput, SignUpStep};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SIGN_UP_FAILED: &str = "Sign up failed. Please try again.";
pub const CONFIRM_FAILED: &str = "Confirmation failed. Please try again.";
pub const SIGN_IN_FAILED: &str = "Sign in failed. Please try again.";
pub const SIGN_OUT_FAILED: &str = "Sign out failed. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthStep {
    SignUp,
    Confirm,
    SignIn,
}

/// Serializable snapshot of the flow handed back to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct FlowView {
    pub step: AuthStep,
    pub navigate_to: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthFlow {
    step: AuthStep,
    error: Option<&'static str>,
    redirect_url: String,
    pending_username: Option<String>,
}

impl AuthFlow {
    /// Fresh flow on the sign-up tab.
    #[must_use]
    pub fn new(redirect: Option<&str>) -> Self {
        Self {
            step: AuthStep::SignUp,
            error: None,
            redirect_url: safe_redirect(redirect),
            pending_username: None,
        }
    }

    /// Flow resumed at the confirmation step for `username`.
    #[must_use]
    pub fn awaiting_confirmation(username: &str, redirect: Option<&str>) -> Self {
        let mut flow = Self::new(redirect);
        flow.step = AuthStep::Confirm;
        flow.pending_username = Some(username.to_string());
        flow
    }

    #[must_use]
    pub fn step(&self) -> AuthStep {
        self.step
    }

    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    #[must_use]
    pub fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    /// Tabs only switch between sign up and sign in.
    pub fn select_tab(&mut self, step: AuthStep) {
        if step != AuthStep::Confirm {
            self.step = step;
        }
    }

    /// Apply a sign-up outcome. Returns where to navigate, if anywhere.
    pub fn on_sign_up<E>(
        &mut self,
        username: &str,
        result: &Result<SignUpOutput, E>,
    ) -> Option<String> {
        self.error = None;
        match result {
            Ok(output) if output.next_step == SignUpStep::ConfirmSignUp => {
                self.pending_username = Some(username.to_string());
                self.step = AuthStep::Confirm;
                None
            }
            Ok(output) if output.is_sign_up_complete => Some(SIGN_IN_PATH.to_string()),
            Ok(_) => None,
            Err(_) => {
                self.error = Some(SIGN_UP_FAILED);
                None
            }
        }
    }

    pub fn on_confirm<E>(&mut self, result: &Result<bool, E>) -> Option<String> {
        self.error = None;
        match result {
            Ok(true) => Some(self.redirect_url.clone()),
            Ok(false) => None,
            Err(_) => {
                self.error = Some(CONFIRM_FAILED);
                None
            }
        }
    }

    /// A finished sign in only counts once the provider has issued tokens.
    pub fn on_sign_in<E>(&mut self, result: &Result<SignInOutput, E>) -> Option<String> {
        self.error = None;
        match result {
            Ok(output) if output.next_step == SignInStep::Done && output.tokens.is_some() => {
                Some(HOME_PATH.to_string())
            }
            Ok(output) if output.next_step == SignInStep::Done => {
                self.error = Some(SIGN_IN_FAILED);
                None
            }
            Ok(_) => None,
            Err(_) => {
                self.error = Some(SIGN_IN_FAILED);
                None
            }
        }
    }

    #[must_use]
    pub fn view(&self, navigate_to: Option<String>) -> FlowView {
        FlowView {
            step: self.step,
            navigate_to,
            error: self.error.map(str::to_string),
        }
    }
}

/// Only same-site absolute paths are honoured as redirect targets.
fn safe_redirect(redirect: Option<&str>) -> String {
    match redirect {
        Some(target)
            if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') =>
        {
            target.to_string()
        }
        _ => HOME_PATH.to_string(),
    }
}

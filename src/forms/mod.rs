//! Form inputs and the sign-up / sign-in flow they drive.

mod flow;
mod validation;

pub use flow::{
    AuthFlow, AuthStep, FlowView, CONFIRM_FAILED, SIGN_IN_FAILED, SIGN_OUT_FAILED,
    SIGN_UP_FAILED,
};
pub use validation::{
    ConfirmForm, ConfirmationCode, Email, Field, Password, Rule, SignInForm, SignUpForm,
    ValidationError, MIN_CODE_LENGTH, MIN_PASSWORD_LENGTH,
};

//! Typed form inputs. Constructors validate; a built value is always valid.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_CODE_LENGTH: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    Code,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
            Self::Code => "code",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    EmailFormat,
    MinLength(usize),
    MatchesPassword,
}

impl Rule {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailFormat => "email_format",
            Self::MinLength(_) => "min_length",
            Self::MatchesPassword => "matches_password",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub field: Field,
    pub rule: Rule,
}

impl ValidationError {
    const fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// User-facing message for the violated rule.
    #[must_use]
    pub fn message(&self) -> String {
        match (self.field, self.rule) {
            (_, Rule::EmailFormat) => "Invalid email address".to_string(),
            (Field::Code, Rule::MinLength(min)) => {
                format!("Confirmation code must be at least {min} characters")
            }
            (_, Rule::MinLength(min)) => format!("Password must be at least {min} characters"),
            (_, Rule::MatchesPassword) => "Passwords do not match".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// # Errors
    /// Returns [`Rule::EmailFormat`] if `value` does not look like an address.
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let valid = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(value));
        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::new(Field::Email, Rule::EmailFormat))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn min_length(
    value: String,
    min: usize,
    field: Field,
) -> Result<SecretString, ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(field, Rule::MinLength(min)));
    }
    Ok(SecretString::from(value))
}

#[derive(Debug)]
pub struct Password(SecretString);

impl Password {
    /// # Errors
    /// Returns [`Rule::MinLength`] for passwords shorter than [`MIN_PASSWORD_LENGTH`].
    pub fn new(value: String) -> Result<Self, ValidationError> {
        min_length(value, MIN_PASSWORD_LENGTH, Field::Password).map(Self)
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

#[derive(Debug)]
pub struct ConfirmationCode(SecretString);

impl ConfirmationCode {
    /// # Errors
    /// Returns [`Rule::MinLength`] for codes shorter than [`MIN_CODE_LENGTH`].
    pub fn new(value: String) -> Result<Self, ValidationError> {
        min_length(value, MIN_CODE_LENGTH, Field::Code).map(Self)
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

#[derive(Debug)]
pub struct SignUpForm {
    email: Email,
    password: Password,
}

impl SignUpForm {
    /// Fields are checked in form order; the first violation is returned.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn new(
        email: &str,
        password: String,
        confirm_password: &str,
    ) -> Result<Self, ValidationError> {
        let email = Email::new(email)?;
        let password = Password::new(password)?;
        if password.secret().expose_secret() != confirm_password {
            return Err(ValidationError::new(
                Field::ConfirmPassword,
                Rule::MatchesPassword,
            ));
        }
        Ok(Self { email, password })
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[derive(Debug)]
pub struct SignInForm {
    email: Email,
    password: Password,
}

impl SignInForm {
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn new(email: &str, password: String) -> Result<Self, ValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[derive(Debug)]
pub struct ConfirmForm {
    code: ConfirmationCode,
}

impl ConfirmForm {
    /// # Errors
    /// Returns [`Rule::MinLength`] on the code field.
    pub fn new(code: String) -> Result<Self, ValidationError> {
        Ok(Self {
            code: ConfirmationCode::new(code)?,
        })
    }

    #[must_use]
    pub fn code(&self) -> &ConfirmationCode {
        &self.code
    }
}

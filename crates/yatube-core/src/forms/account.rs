//! Signup and login forms.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError};

use super::{FieldKind, FieldSchema, FormErrors, FormSchema, NON_FIELD_ERRORS, not_blank};

pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom(function = "username_chars")
    )]
    pub username: String,
    #[validate(custom(function = "optional_email"))]
    pub email: String,
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    pub password2: String,
}

impl SignupForm {
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSchema::new("username", FieldKind::Text, "Username")
                .help("150 characters or fewer. Letters, digits and @/./+/-/_ only."),
            FieldSchema::new("email", FieldKind::Email, "Email address").optional(),
            FieldSchema::new("password1", FieldKind::Password, "Password"),
            FieldSchema::new("password2", FieldKind::Password, "Password confirmation")
                .help("Enter the same password as before, for verification."),
        ])
    }

    /// Submitted values minus the passwords, for redisplay.
    pub fn values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("username".to_string(), self.username.clone());
        values.insert("email".to_string(), self.email.clone());
        values
    }

    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }
        errors.into_result(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    /// Local path to return to after a successful login.
    pub next: Option<String>,
}

impl LoginForm {
    pub fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSchema::new("username", FieldKind::Text, "Username"),
            FieldSchema::new("password", FieldKind::Password, "Password"),
        ])
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("username".to_string(), self.username.clone());
        if let Some(next) = &self.next {
            values.insert("next".to_string(), next.clone());
        }
        values
    }

    pub fn clean(&self) -> Result<(), FormErrors> {
        self.validate().map_err(FormErrors::from)
    }

    pub fn bad_credentials() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add(NON_FIELD_ERRORS, BAD_CREDENTIALS);
        errors
    }
}

fn username_chars(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid");
    error.message = Some(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
            .into(),
    );
    Err(error)
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Enter a valid email address.".into());
    Err(error)
}

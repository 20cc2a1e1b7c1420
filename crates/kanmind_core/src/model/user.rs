//! User identity and registration model.
//!
//! # Invariants
//! - `email` is unique case-insensitively across users.
//! - `first_name`/`last_name` are derived from `username` at registration.
//! - Credentials are owned by the auth collaborator and never stored here.

use crate::model::validation::{require_non_blank, ValidationError, ValidationRule};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub type UserId = Uuid;

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Full name as typed at registration.
    #[serde(rename = "fullname")]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
}

impl User {
    /// Creates a regular (non-superuser) user with a generated id.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let username = username.into();
        let (first_name, last_name) = split_full_name(&username);
        Self {
            id: Uuid::new_v4(),
            username,
            email: email.into().trim().to_string(),
            first_name,
            last_name,
            is_superuser: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("fullname", &self.username)?;
        validate_email(&self.email)
    }
}

/// Registration payload as received from the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub repeated_password: String,
}

impl RegistrationRequest {
    /// Checks payload shape and converts it into a new user record.
    ///
    /// Email uniqueness needs the store and is checked by the service.
    pub fn into_user(self) -> Result<User, ValidationError> {
        require_non_blank("fullname", &self.fullname)?;
        validate_email(&self.email)?;
        require_non_blank("password", &self.password)?;
        if self.password != self.repeated_password {
            return Err(ValidationError::new(
                "repeated_password",
                ValidationRule::PasswordMismatch,
            ));
        }
        Ok(User::new(self.fullname.trim(), self.email))
    }
}

/// Splits a full name at the first run of whitespace.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    require_non_blank("email", trimmed)?;
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::new("email", ValidationRule::InvalidEmail));
    }
    Ok(())
}

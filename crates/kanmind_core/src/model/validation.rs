//! Field-level validation errors.
//!
//! These describe an internally inconsistent proposed state (blank title,
//! assignee outside the board, ...). They never encode access decisions.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Rule violated by a proposed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Value is empty after trim.
    Blank,
    /// Value is not a well-formed email address.
    InvalidEmail,
    /// Field may only be set at creation time.
    Immutable,
    /// Proposed user is neither owner nor member of the board.
    NotBoardMember(Uuid),
    /// Referenced user does not exist.
    UnknownUser(Uuid),
    /// Password and repeated password differ.
    PasswordMismatch,
    /// Email is already registered.
    DuplicateEmail,
}

/// Field-level invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: ValidationRule,
}

impl ValidationError {
    pub fn new(field: &'static str, rule: ValidationRule) -> Self {
        Self { field, rule }
    }

    pub fn blank(field: &'static str) -> Self {
        Self::new(field, ValidationRule::Blank)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = self.field;
        match &self.rule {
            ValidationRule::Blank => write!(f, "{field} must not be blank"),
            ValidationRule::InvalidEmail => write!(f, "{field} is not a valid email address"),
            ValidationRule::Immutable => write!(f, "{field} cannot be changed after creation"),
            ValidationRule::NotBoardMember(user_id) => {
                write!(f, "{field} {user_id} is not an owner or member of the board")
            }
            ValidationRule::UnknownUser(user_id) => write!(f, "{field} {user_id} does not exist"),
            ValidationRule::PasswordMismatch => write!(f, "{field} does not match password"),
            ValidationRule::DuplicateEmail => write!(f, "{field} is already registered"),
        }
    }
}

impl Error for ValidationError {}

/// Returns `Err(blank)` when `value` is empty after trim.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::blank(field));
    }
    Ok(())
}

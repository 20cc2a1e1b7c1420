//! User registration and lookup service.
//!
//! Password hashing and token issuance belong to the auth collaborator; this
//! service only validates the registration payload and stores the identity.

use crate::access::identity::Actor;
use crate::model::user::{validate_email, RegistrationRequest, User};
use crate::model::validation::{ValidationError, ValidationRule};
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::guard::require_identity;
use log::info;

pub struct UserService<U> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Registers a new regular user. Open to anonymous callers.
    pub fn register(&self, request: RegistrationRequest) -> ServiceResult<User> {
        let user = request.into_user()?;
        if self.users.find_user_by_email(&user.email)?.is_some() {
            return Err(ValidationError::new("email", ValidationRule::DuplicateEmail).into());
        }

        self.users.create_user(&user)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Resolves an email to a user, e.g. before adding a board member.
    pub fn check_email(&self, actor: &Actor, email: &str) -> ServiceResult<User> {
        require_identity(actor, "email_check")?;
        validate_email(email)?;
        self.users
            .find_user_by_email(email)?
            .ok_or_else(|| ServiceError::not_found("user", email.trim()))
    }
}

//! Request identities supplied by the auth collaborator.

use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};

/// Authenticated identity as far as authorization is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub is_superuser: bool,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: UserId) -> Self {
        Self {
            user_id,
            is_superuser: true,
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_superuser: user.is_superuser,
        }
    }
}

/// The party making the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    /// No valid credentials were presented.
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Actor {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }

    /// Stable label for log lines; never includes profile data.
    pub fn log_label(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::Authenticated(identity) => identity.user_id.to_string(),
        }
    }
}

impl From<Identity> for Actor {
    fn from(identity: Identity) -> Self {
        Self::Authenticated(identity)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::Authenticated(Identity::from(user))
    }
}

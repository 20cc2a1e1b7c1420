//! Request-terminal error taxonomy shared by all services.

use crate::access::engine::{DenyReason, ResourceKind, Verb};
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// No valid actor on the request.
    Unauthenticated,
    /// Target id (or lookup key) does not resolve.
    NotFound { kind: &'static str, key: String },
    /// Authorization denied.
    Forbidden {
        verb: Verb,
        kind: ResourceKind,
        reason: DenyReason,
    },
    /// Proposed state violates a field-level invariant.
    Validation(ValidationError),
    /// Storage failure.
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// HTTP status class expected by the request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Validation(_) => 400,
            Self::Repo(_) => 500,
        }
    }

    /// Stable machine-readable code for logs and response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::Validation(_) => "validation_error",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::NotFound { kind, key } => write!(f, "{kind} not found: {key}"),
            Self::Forbidden { verb, kind, reason } => write!(
                f,
                "{} on {} denied: {reason}",
                verb.as_str(),
                kind.as_str()
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::not_found(kind, id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::access::engine::{DenyReason, ResourceKind, Verb};
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(ServiceError::Unauthenticated.status_code(), 401);
        assert_eq!(ServiceError::not_found("board", "x").status_code(), 404);
        assert_eq!(
            ServiceError::Forbidden {
                verb: Verb::Delete,
                kind: ResourceKind::Board,
                reason: DenyReason::NotBoardOwner,
            }
            .status_code(),
            403
        );
        assert_eq!(
            ServiceError::from(ValidationError::blank("title")).status_code(),
            400
        );
    }

    #[test]
    fn repo_not_found_keeps_not_found_class() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(RepoError::NotFound { kind: "task", id });
        assert!(matches!(
            err,
            ServiceError::NotFound { kind: "task", ref key } if *key == id.to_string()
        ));
    }
}

//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per record type.
//! - Isolate SQL details from service orchestration and access decisions.
//!
//! # Invariants
//! - Write paths call the model's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-row writes run inside one transaction.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod board_repo;
pub mod comment_repo;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { kind: &'static str, id: Uuid },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn uuid_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, table, column)
}

pub(crate) fn optional_uuid_column(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse_uuid(&text, table, column).map(Some),
        None => Ok(None),
    }
}

fn parse_uuid(text: &str, table: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn int_to_bool(value: i64, table: &str, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

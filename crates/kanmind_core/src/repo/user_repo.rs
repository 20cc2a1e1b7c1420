//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email lookups are case-insensitive (`COLLATE NOCASE` column).
//! - Duplicate emails surface as a validation error, not a raw constraint error.

use crate::model::user::{User, UserId};
use crate::model::validation::{ValidationError, ValidationRule};
use crate::repo::{bool_to_int, int_to_bool, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    first_name,
    last_name,
    is_superuser
FROM users";

/// Repository interface for user identities.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Returns the ids from `ids` that do not resolve to a user.
    fn missing_users(&self, ids: &[UserId]) -> RepoResult<Vec<UserId>>;
}

/// SQLite-backed user repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, filter_sql: &str, value: String) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {filter_sql};"))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO users (
                id,
                username,
                email,
                first_name,
                last_name,
                is_superuser
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                bool_to_int(user.is_superuser),
            ],
        );

        match inserted {
            Ok(_) => Ok(user.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(ValidationError::new("email", ValidationRule::DuplicateEmail).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.query_one("id = ?1", id.to_string())
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.query_one("email = ?1", email.trim().to_string())
    }

    fn missing_users(&self, ids: &[UserId]) -> RepoResult<Vec<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);")?;
        let mut missing = Vec::new();
        for id in ids {
            let found: i64 = stmt.query_row([id.to_string()], |row| row.get(0))?;
            if found == 0 && !missing.contains(id) {
                missing.push(*id);
            }
        }
        Ok(missing)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: uuid_column(row, "users", "id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        is_superuser: int_to_bool(row.get("is_superuser")?, "users", "is_superuser")?,
    };
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("user {} failed validation: {err}", user.id))
    })?;
    Ok(user)
}

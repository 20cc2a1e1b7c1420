//! Comment repository contracts and SQLite implementation.

use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::repo::{uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    board_id,
    author_id,
    content,
    created_at
FROM comments";

/// Repository interface for comment persistence.
pub trait CommentRepository {
    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Lists comments of one task, oldest first.
    fn list_task_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
}

/// SQLite-backed comment repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId> {
        comment.validate()?;

        self.conn.execute(
            "INSERT INTO comments (
                id,
                task_id,
                board_id,
                author_id,
                content,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                comment.id.to_string(),
                comment.task_id.to_string(),
                comment.board_id.to_string(),
                comment.author_id.to_string(),
                comment.content.as_str(),
                comment.created_at,
            ],
        )?;

        Ok(comment.id)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_comment_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_task_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL} WHERE task_id = ?1 ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("comment", id));
        }
        Ok(())
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let comment = Comment {
        id: uuid_column(row, "comments", "id")?,
        task_id: uuid_column(row, "comments", "task_id")?,
        board_id: uuid_column(row, "comments", "board_id")?,
        author_id: uuid_column(row, "comments", "author_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    };
    comment.validate()?;
    Ok(comment)
}

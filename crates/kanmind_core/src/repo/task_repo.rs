//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `board_id` and `creator_id` are written on insert only.
//! - Scoped list queries use the `assignee_id`/`reviewer_id` indices.
//! - Deleting a task cascades to its comments via foreign keys.

use crate::access::visibility::{TaskFilter, TaskScope};
use crate::model::board::BoardId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskRecord, TaskStatus};
use crate::repo::{optional_uuid_column, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    t.id,
    t.board_id,
    t.creator_id,
    t.title,
    t.description,
    t.status,
    t.priority,
    t.assignee_id,
    t.reviewer_id,
    t.due_date,
    (SELECT COUNT(*) FROM comments c WHERE c.task_id = t.id) AS comments_count
FROM tasks t";

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Writes mutable fields only; board and creator stay as inserted.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Lists tasks of one board in creation order.
    fn list_board_tasks(&self, board_id: BoardId) -> RepoResult<Vec<TaskRecord>>;
    /// Lists tasks matching a personal scope across all boards.
    fn list_tasks(&self, filter: &TaskFilter) -> RepoResult<Vec<TaskRecord>>;
}

/// SQLite-backed task repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_records(&self, filter_sql: &str, value: String) -> RepoResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE {filter_sql} ORDER BY t.rowid ASC;"
        ))?;
        let mut rows = stmt.query([value])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(TaskRecord {
                task: parse_task_row(row)?,
                comments_count: row.get("comments_count")?,
            });
        }
        Ok(records)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                board_id,
                creator_id,
                title,
                description,
                status,
                priority,
                assignee_id,
                reviewer_id,
                due_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                task.id.to_string(),
                task.board_id.to_string(),
                task.creator_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.assignee_id.map(|id| id.to_string()),
                task.reviewer_id.map(|id| id.to_string()),
                task.due_date,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                status = ?3,
                priority = ?4,
                assignee_id = ?5,
                reviewer_id = ?6,
                due_date = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.assignee_id.map(|id| id.to_string()),
                task.reviewer_id.map(|id| id.to_string()),
                task.due_date,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task.id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }
        Ok(())
    }

    fn list_board_tasks(&self, board_id: BoardId) -> RepoResult<Vec<TaskRecord>> {
        self.query_records("t.board_id = ?1", board_id.to_string())
    }

    fn list_tasks(&self, filter: &TaskFilter) -> RepoResult<Vec<TaskRecord>> {
        let filter_sql = match filter.scope {
            TaskScope::AssignedToMe => "t.assignee_id = ?1",
            TaskScope::Reviewing => "t.reviewer_id = ?1",
        };
        self.query_records(filter_sql, filter.user_id.to_string())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let task = Task {
        id: uuid_column(row, "tasks", "id")?,
        board_id: uuid_column(row, "tasks", "board_id")?,
        creator_id: uuid_column(row, "tasks", "creator_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority,
        assignee_id: optional_uuid_column(row, "tasks", "assignee_id")?,
        reviewer_id: optional_uuid_column(row, "tasks", "reviewer_id")?,
        due_date: row.get("due_date")?,
    };
    task.validate()?;
    Ok(task)
}

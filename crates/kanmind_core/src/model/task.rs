//! Task model.
//!
//! # Invariants
//! - `board_id` and `creator_id` are set once at creation.
//! - `assignee_id`/`reviewer_id` must have access to the board when set; that
//!   check needs membership state and lives in the task service.
//! - `title` is non-blank.

use crate::model::board::BoardId;
use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

/// Kanban column of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "to-do" => Some(Self::ToDo),
            "in-progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "board")]
    pub board_id: BoardId,
    pub creator_id: UserId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
}

impl Task {
    /// Creates a `to-do`, `medium` priority task with a generated id.
    pub fn new(board_id: BoardId, creator_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            creator_id,
            title: title.into().trim().to_string(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assignee_id: None,
            reviewer_id: None,
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)
    }
}

/// Task list projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub task: Task,
    pub comments_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPriority, TaskStatus};
    use uuid::Uuid;

    #[test]
    fn status_uses_board_column_names() {
        for status in [
            TaskStatus::ToDo,
            TaskStatus::InProgress,
            TaskStatus::Review,
            TaskStatus::Done,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("todo"), None);
    }

    #[test]
    fn new_task_defaults_to_todo_medium() {
        let task = Task::new(Uuid::new_v4(), Uuid::new_v4(), " Write docs ");
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assignee_id.is_none());
    }
}

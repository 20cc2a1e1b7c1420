//! Comment model.
//!
//! # Invariants
//! - `task_id`, `board_id` and `author_id` are set once at creation.
//! - `board_id` mirrors the parent task's board.
//! - `content` is non-blank.

use crate::model::board::BoardId;
use crate::model::task::{Task, TaskId};
use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type CommentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub board_id: BoardId,
    pub author_id: UserId,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Comment {
    /// Creates a comment on `task`, copying its board reference.
    pub fn new(task: &Task, author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: task.id,
            board_id: task.board_id,
            author_id,
            content: content.into().trim().to_string(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("content", &self.content)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

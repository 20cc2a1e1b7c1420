//! List visibility predicates.
//!
//! List endpoints receive one of these filters instead of running the
//! decision table per item. Repositories render them to SQL; `matches`
//! evaluates the same predicate in memory.

use crate::access::identity::Identity;
use crate::model::board::Board;
use crate::model::task::Task;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Boards owned by `user_id` or listing it as a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardFilter {
    pub user_id: UserId,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board) -> bool {
        board.has_access(self.user_id)
    }
}

/// Personal task list selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskScope {
    AssignedToMe,
    Reviewing,
}

impl TaskScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AssignedToMe => "assigned-to-me",
            Self::Reviewing => "reviewing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "assigned-to-me" => Some(Self::AssignedToMe),
            "reviewing" => Some(Self::Reviewing),
            _ => None,
        }
    }
}

/// Tasks pointing at `user_id` in the given role.
///
/// Not gated by board membership: a user keeps seeing tasks assigned to
/// them after leaving the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub user_id: UserId,
    pub scope: TaskScope,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let target = match self.scope {
            TaskScope::AssignedToMe => task.assignee_id,
            TaskScope::Reviewing => task.reviewer_id,
        };
        target == Some(self.user_id)
    }
}

pub fn visible_boards(identity: &Identity) -> BoardFilter {
    BoardFilter {
        user_id: identity.user_id,
    }
}

pub fn visible_tasks(identity: &Identity, scope: TaskScope) -> TaskFilter {
    TaskFilter {
        user_id: identity.user_id,
        scope,
    }
}

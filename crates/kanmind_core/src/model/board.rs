//! Board model and summary read model.
//!
//! # Invariants
//! - `owner_id` is set at creation and never changes.
//! - `members` never contains the owner; ownership already implies access.
//! - `title` is non-blank.

use crate::model::user::UserId;
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type BoardId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub owner_id: UserId,
    pub members: BTreeSet<UserId>,
}

impl Board {
    /// Creates a board owned by `owner_id` with a generated id.
    ///
    /// The owner is stripped from `members` if listed.
    pub fn new(
        title: impl Into<String>,
        owner_id: UserId,
        members: impl IntoIterator<Item = UserId>,
    ) -> Self {
        let mut board = Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            owner_id,
            members: BTreeSet::new(),
        };
        board.replace_members(members);
        board
    }

    /// Replaces the explicit member set, keeping the owner out of it.
    pub fn replace_members(&mut self, members: impl IntoIterator<Item = UserId>) {
        let owner_id = self.owner_id;
        self.members = members
            .into_iter()
            .filter(|member| *member != owner_id)
            .collect();
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Owner or explicit member.
    pub fn has_access(&self, user_id: UserId) -> bool {
        self.is_owner(user_id) || self.is_member(user_id)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("title", &self.title)
    }
}

/// Board list/detail projection with derived counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: BoardId,
    pub title: String,
    pub owner_id: UserId,
    /// Explicit members only; the owner is not counted.
    pub member_count: u32,
    pub ticket_count: u32,
    pub tasks_to_do_count: u32,
    pub tasks_high_prio_count: u32,
}

#[cfg(test)]
mod tests {
    use super::Board;
    use uuid::Uuid;

    #[test]
    fn owner_is_never_stored_as_member() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let board = Board::new("Sprint", owner, [owner, member, member]);

        assert_eq!(board.members.len(), 1);
        assert!(board.is_member(member));
        assert!(!board.is_member(owner));
        assert!(board.has_access(owner));
    }

    #[test]
    fn third_party_has_no_access() {
        let board = Board::new("Sprint", Uuid::new_v4(), [Uuid::new_v4()]);
        assert!(!board.has_access(Uuid::new_v4()));
    }

    #[test]
    fn blank_title_fails_validation() {
        let board = Board::new("   ", Uuid::new_v4(), []);
        let err = board.validate().expect_err("blank title must fail");
        assert_eq!(err.field, "title");
    }
}

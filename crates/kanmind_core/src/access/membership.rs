//! Board membership resolution.
//!
//! # Invariants
//! - The owner has access even when absent from the explicit member set.
//! - Unknown boards resolve to "not owner, not member".
//! - Every call is a keyed lookup, never a scan over members.

use crate::model::board::{Board, BoardId};
use crate::model::user::UserId;
use crate::repo::RepoResult;
use std::collections::{BTreeMap, BTreeSet};

/// Answers ownership/membership questions for one `(board, user)` pair.
pub trait MembershipResolver {
    fn is_owner(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool>;

    /// True only for explicit members.
    fn is_member(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool>;

    fn has_access(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        Ok(self.is_owner(board_id, user_id)? || self.is_member(board_id, user_id)?)
    }
}

impl<M: MembershipResolver + ?Sized> MembershipResolver for &M {
    fn is_owner(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        (**self).is_owner(board_id, user_id)
    }

    fn is_member(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        (**self).is_member(board_id, user_id)
    }

    fn has_access(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        (**self).has_access(board_id, user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardAccess {
    owner_id: UserId,
    members: BTreeSet<UserId>,
}

/// In-memory membership table, e.g. for callers holding a board snapshot.
#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    boards: BTreeMap<BoardId, BoardAccess>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the access entry for `board`.
    pub fn insert_board(&mut self, board: &Board) {
        self.boards.insert(
            board.id,
            BoardAccess {
                owner_id: board.owner_id,
                members: board.members.clone(),
            },
        );
    }

    pub fn remove_board(&mut self, board_id: BoardId) {
        self.boards.remove(&board_id);
    }

    /// Adds an explicit member. Returns `false` for unknown boards or owners.
    pub fn add_member(&mut self, board_id: BoardId, user_id: UserId) -> bool {
        match self.boards.get_mut(&board_id) {
            Some(access) if access.owner_id != user_id => {
                access.members.insert(user_id);
                true
            }
            _ => false,
        }
    }

    pub fn remove_member(&mut self, board_id: BoardId, user_id: UserId) -> bool {
        self.boards
            .get_mut(&board_id)
            .is_some_and(|access| access.members.remove(&user_id))
    }
}

impl<'a> FromIterator<&'a Board> for MembershipTable {
    fn from_iter<I: IntoIterator<Item = &'a Board>>(iter: I) -> Self {
        let mut table = Self::new();
        for board in iter {
            table.insert_board(board);
        }
        table
    }
}

impl MembershipResolver for MembershipTable {
    fn is_owner(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        Ok(self
            .boards
            .get(&board_id)
            .is_some_and(|access| access.owner_id == user_id))
    }

    fn is_member(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        Ok(self
            .boards
            .get(&board_id)
            .is_some_and(|access| access.members.contains(&user_id)))
    }
}

//! Board use-case service.
//!
//! # Responsibility
//! - Create, list, read, update and delete boards on behalf of an actor.
//!
//! # Invariants
//! - The acting user becomes the owner on create; ownership never moves.
//! - Member ids must resolve to existing users.
//! - Only the owner changes the member set.
//! - Lists are narrowed by the visibility filter, not per-item checks.

use crate::access::engine::{Resource, Verb};
use crate::access::identity::Actor;
use crate::access::membership::MembershipResolver;
use crate::access::visibility::visible_boards;
use crate::model::board::{Board, BoardId, BoardSummary};
use crate::model::user::UserId;
use crate::model::validation::{ValidationError, ValidationRule};
use crate::repo::board_repo::BoardRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::guard::{enforce, require_identity};
use log::info;
use serde::Deserialize;

/// Request model for board creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateBoardRequest {
    pub title: String,
    /// Initial explicit members. The owner is dropped if listed.
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// Partial board update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateBoardRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Replaces the whole explicit member set when present.
    #[serde(default)]
    pub members: Option<Vec<UserId>>,
}

/// Use-case service for boards.
pub struct BoardService<B, U> {
    boards: B,
    users: U,
}

impl<B, U> BoardService<B, U>
where
    B: BoardRepository + MembershipResolver,
    U: UserRepository,
{
    pub fn new(boards: B, users: U) -> Self {
        Self { boards, users }
    }

    /// Creates a board owned by the acting user.
    pub fn create_board(
        &self,
        actor: &Actor,
        request: &CreateBoardRequest,
    ) -> ServiceResult<BoardSummary> {
        let identity = require_identity(actor, "board_create")?;
        enforce(&self.boards, actor, Verb::Create, &Resource::boards())?;

        let board = Board::new(
            request.title.as_str(),
            identity.user_id,
            request.members.iter().copied(),
        );
        board.validate()?;
        self.ensure_users_exist(board.members.iter().copied())?;

        self.boards.create_board(&board)?;
        info!(
            "event=board_create module=service status=ok board_id={} member_count={}",
            board.id,
            board.members.len()
        );
        self.summary(board.id)
    }

    /// Lists boards the actor owns or is a member of.
    pub fn list_boards(&self, actor: &Actor) -> ServiceResult<Vec<BoardSummary>> {
        let identity = require_identity(actor, "board_list")?;
        enforce(&self.boards, actor, Verb::Read, &Resource::boards())?;
        Ok(self.boards.list_boards(&visible_boards(&identity))?)
    }

    /// Reads one board with its explicit member set.
    pub fn get_board(&self, actor: &Actor, id: BoardId) -> ServiceResult<Board> {
        require_identity(actor, "board_get")?;
        let board = self.load(id)?;
        enforce(&self.boards, actor, Verb::Read, &Resource::board(&board))?;
        Ok(board)
    }

    /// Reads the counters projection of one board.
    pub fn get_board_summary(&self, actor: &Actor, id: BoardId) -> ServiceResult<BoardSummary> {
        require_identity(actor, "board_summary")?;
        if !self.boards.board_exists(id)? {
            return Err(ServiceError::not_found("board", id));
        }
        enforce(
            &self.boards,
            actor,
            Verb::Read,
            &Resource::Board { board_id: Some(id) },
        )?;
        self.summary(id)
    }

    /// Applies a title change and/or member-set replacement.
    ///
    /// Members may rename the board; only the owner may replace its members.
    pub fn update_board(
        &self,
        actor: &Actor,
        id: BoardId,
        request: &UpdateBoardRequest,
    ) -> ServiceResult<Board> {
        require_identity(actor, "board_update")?;
        let mut board = self.load(id)?;
        enforce(&self.boards, actor, Verb::Update, &Resource::board(&board))?;
        if request.members.is_some() {
            enforce(
                &self.boards,
                actor,
                Verb::Update,
                &Resource::board_members(&board),
            )?;
        }

        if let Some(title) = &request.title {
            board.title = title.trim().to_string();
        }
        if let Some(members) = &request.members {
            board.replace_members(members.iter().copied());
            self.ensure_users_exist(board.members.iter().copied())?;
        }
        board.validate()?;

        self.boards.update_board(&board)?;
        info!(
            "event=board_update module=service status=ok board_id={} member_count={}",
            board.id,
            board.members.len()
        );
        Ok(board)
    }

    /// Deletes a board together with its tasks and comments.
    pub fn delete_board(&self, actor: &Actor, id: BoardId) -> ServiceResult<()> {
        require_identity(actor, "board_delete")?;
        let board = self.load(id)?;
        enforce(&self.boards, actor, Verb::Delete, &Resource::board(&board))?;

        self.boards.delete_board(id)?;
        info!("event=board_delete module=service status=ok board_id={id}");
        Ok(())
    }

    fn load(&self, id: BoardId) -> ServiceResult<Board> {
        self.boards
            .get_board(id)?
            .ok_or_else(|| ServiceError::not_found("board", id))
    }

    fn summary(&self, id: BoardId) -> ServiceResult<BoardSummary> {
        self.boards
            .get_board_summary(id)?
            .ok_or_else(|| ServiceError::not_found("board", id))
    }

    fn ensure_users_exist(&self, ids: impl Iterator<Item = UserId>) -> ServiceResult<()> {
        let ids: Vec<UserId> = ids.collect();
        match self.users.missing_users(&ids)?.first() {
            Some(missing) => Err(ValidationError::new(
                "members",
                ValidationRule::UnknownUser(*missing),
            )
            .into()),
            None => Ok(()),
        }
    }
}

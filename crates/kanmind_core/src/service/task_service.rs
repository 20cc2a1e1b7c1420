//! Task use-case service.
//!
//! # Responsibility
//! - Create, read, patch and delete tasks inside boards.
//! - Serve per-board task lists and the personal `assigned-to-me` /
//!   `reviewing` lists.
//!
//! # Invariants
//! - `creator_id` is always the acting user.
//! - A task never moves to another board.
//! - A newly set assignee/reviewer must be owner or member of the board, even
//!   when the acting user is the owner.

use crate::access::engine::{Resource, Verb};
use crate::access::identity::Actor;
use crate::access::membership::MembershipResolver;
use crate::access::visibility::{visible_tasks, TaskScope};
use crate::model::board::BoardId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskRecord, TaskStatus};
use crate::model::user::UserId;
use crate::model::validation::{ValidationError, ValidationRule};
use crate::repo::board_repo::BoardRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::double_option;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::guard::{enforce, require_identity};
use log::info;
use serde::Deserialize;

/// Request model for task creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(rename = "board")]
    pub board_id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub reviewer_id: Option<UserId>,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub due_date: Option<i64>,
}

impl CreateTaskRequest {
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            title: title.into(),
            description: String::new(),
            status: None,
            priority: None,
            assignee_id: None,
            reviewer_id: None,
            due_date: None,
        }
    }
}

/// Partial task update.
///
/// Outer `None` leaves a field unchanged; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskRequest {
    /// Accepted only when equal to the current board.
    #[serde(default, rename = "board")]
    pub board_id: Option<BoardId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<i64>>,
}

/// Use-case service for tasks.
pub struct TaskService<T, B> {
    tasks: T,
    boards: B,
}

impl<T, B> TaskService<T, B>
where
    T: TaskRepository,
    B: BoardRepository + MembershipResolver,
{
    pub fn new(tasks: T, boards: B) -> Self {
        Self { tasks, boards }
    }

    /// Creates a task on an existing board with the actor as creator.
    pub fn create_task(&self, actor: &Actor, request: &CreateTaskRequest) -> ServiceResult<Task> {
        let identity = require_identity(actor, "task_create")?;
        if !self.boards.board_exists(request.board_id)? {
            return Err(ServiceError::not_found("board", request.board_id));
        }
        enforce(
            &self.boards,
            actor,
            Verb::Create,
            &Resource::new_task(request.board_id),
        )?;

        let mut task = Task::new(request.board_id, identity.user_id, request.title.as_str());
        task.description = request.description.clone();
        task.status = request.status.unwrap_or_default();
        task.priority = request.priority.unwrap_or_default();
        task.assignee_id = request.assignee_id;
        task.reviewer_id = request.reviewer_id;
        task.due_date = request.due_date;
        task.validate()?;
        self.ensure_board_access(task.board_id, "assignee_id", task.assignee_id)?;
        self.ensure_board_access(task.board_id, "reviewer_id", task.reviewer_id)?;

        self.tasks.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} board_id={}",
            task.id, task.board_id
        );
        Ok(task)
    }

    pub fn get_task(&self, actor: &Actor, id: TaskId) -> ServiceResult<Task> {
        require_identity(actor, "task_get")?;
        let task = self.load(id)?;
        enforce(&self.boards, actor, Verb::Read, &Resource::task(&task))?;
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// Only assignee/reviewer values set by this request are membership
    /// checked; untouched ones keep their earlier validation.
    pub fn update_task(
        &self,
        actor: &Actor,
        id: TaskId,
        request: &UpdateTaskRequest,
    ) -> ServiceResult<Task> {
        require_identity(actor, "task_update")?;
        let mut task = self.load(id)?;
        enforce(&self.boards, actor, Verb::Update, &Resource::task(&task))?;

        if request
            .board_id
            .is_some_and(|board_id| board_id != task.board_id)
        {
            return Err(ValidationError::new("board", ValidationRule::Immutable).into());
        }

        if let Some(title) = &request.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &request.description {
            task.description = description.clone();
        }
        if let Some(status) = request.status {
            task.status = status;
        }
        if let Some(priority) = request.priority {
            task.priority = priority;
        }
        if let Some(due_date) = request.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee_id) = request.assignee_id {
            self.ensure_board_access(task.board_id, "assignee_id", assignee_id)?;
            task.assignee_id = assignee_id;
        }
        if let Some(reviewer_id) = request.reviewer_id {
            self.ensure_board_access(task.board_id, "reviewer_id", reviewer_id)?;
            task.reviewer_id = reviewer_id;
        }
        task.validate()?;

        self.tasks.update_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_id={} board_id={}",
            task.id, task.board_id
        );
        Ok(task)
    }

    /// Deletes a task and its comments.
    pub fn delete_task(&self, actor: &Actor, id: TaskId) -> ServiceResult<()> {
        require_identity(actor, "task_delete")?;
        let task = self.load(id)?;
        enforce(&self.boards, actor, Verb::Delete, &Resource::task(&task))?;

        self.tasks.delete_task(id)?;
        info!(
            "event=task_delete module=service status=ok task_id={id} board_id={}",
            task.board_id
        );
        Ok(())
    }

    /// Lists all tasks of a board the actor can read.
    pub fn list_board_tasks(
        &self,
        actor: &Actor,
        board_id: BoardId,
    ) -> ServiceResult<Vec<TaskRecord>> {
        require_identity(actor, "task_list_board")?;
        if !self.boards.board_exists(board_id)? {
            return Err(ServiceError::not_found("board", board_id));
        }
        enforce(
            &self.boards,
            actor,
            Verb::Read,
            &Resource::Board {
                board_id: Some(board_id),
            },
        )?;
        Ok(self.tasks.list_board_tasks(board_id)?)
    }

    /// Lists tasks assigned to, or reviewed by, the actor across all boards.
    pub fn list_scoped_tasks(
        &self,
        actor: &Actor,
        scope: TaskScope,
    ) -> ServiceResult<Vec<TaskRecord>> {
        let identity = require_identity(actor, "task_list_scoped")?;
        Ok(self.tasks.list_tasks(&visible_tasks(&identity, scope))?)
    }

    fn load(&self, id: TaskId) -> ServiceResult<Task> {
        self.tasks
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found("task", id))
    }

    fn ensure_board_access(
        &self,
        board_id: BoardId,
        field: &'static str,
        user_id: Option<UserId>,
    ) -> ServiceResult<()> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        if self.boards.has_access(board_id, user_id)? {
            return Ok(());
        }
        Err(ValidationError::new(field, ValidationRule::NotBoardMember(user_id)).into())
    }
}

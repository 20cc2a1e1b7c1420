//! Comment use-case service.
//!
//! # Invariants
//! - Comments are addressed through their parent task; a comment id under
//!   the wrong task is reported as not found.
//! - Only the author may delete a comment, board owner included.

use crate::access::engine::{Resource, Verb};
use crate::access::identity::Actor;
use crate::access::membership::MembershipResolver;
use crate::model::comment::{Comment, CommentId};
use crate::model::task::{Task, TaskId};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::guard::{enforce, require_identity};
use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Use-case service for task comments.
pub struct CommentService<C, T, M> {
    comments: C,
    tasks: T,
    membership: M,
}

impl<C, T, M> CommentService<C, T, M>
where
    C: CommentRepository,
    T: TaskRepository,
    M: MembershipResolver,
{
    pub fn new(comments: C, tasks: T, membership: M) -> Self {
        Self {
            comments,
            tasks,
            membership,
        }
    }

    pub fn create_comment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        request: &CreateCommentRequest,
    ) -> ServiceResult<Comment> {
        let identity = require_identity(actor, "comment_create")?;
        let task = self.load_task(task_id)?;
        enforce(
            &self.membership,
            actor,
            Verb::Create,
            &Resource::task_comments(&task),
        )?;

        let comment = Comment::new(&task, identity.user_id, request.content.as_str());
        comment.validate()?;
        self.comments.create_comment(&comment)?;
        info!(
            "event=comment_create module=service status=ok comment_id={} task_id={}",
            comment.id, task.id
        );
        Ok(comment)
    }

    /// Lists comments of a task, oldest first.
    pub fn list_comments(&self, actor: &Actor, task_id: TaskId) -> ServiceResult<Vec<Comment>> {
        require_identity(actor, "comment_list")?;
        let task = self.load_task(task_id)?;
        enforce(
            &self.membership,
            actor,
            Verb::Read,
            &Resource::task_comments(&task),
        )?;
        Ok(self.comments.list_task_comments(task.id)?)
    }

    pub fn delete_comment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        comment_id: CommentId,
    ) -> ServiceResult<()> {
        require_identity(actor, "comment_delete")?;
        let task = self.load_task(task_id)?;
        let comment = self
            .comments
            .get_comment(comment_id)?
            .filter(|comment| comment.task_id == task.id)
            .ok_or_else(|| ServiceError::not_found("comment", comment_id))?;
        enforce(
            &self.membership,
            actor,
            Verb::Delete,
            &Resource::comment(&comment),
        )?;

        self.comments.delete_comment(comment_id)?;
        info!(
            "event=comment_delete module=service status=ok comment_id={comment_id} task_id={task_id}"
        );
        Ok(())
    }

    fn load_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.tasks
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found("task", id))
    }
}

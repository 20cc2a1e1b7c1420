//! Core domain logic for KanMind boards.
//! This crate is the single source of truth for access rules and business
//! invariants; request glue only maps its results onto HTTP.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::engine::{authorize, Decision, DenyReason, Resource, ResourceKind, Verb};
pub use access::identity::{Actor, Identity};
pub use access::membership::{MembershipResolver, MembershipTable};
pub use access::visibility::{visible_boards, visible_tasks, BoardFilter, TaskFilter, TaskScope};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::board::{Board, BoardId, BoardSummary};
pub use model::comment::{Comment, CommentId};
pub use model::task::{Task, TaskId, TaskPriority, TaskRecord, TaskStatus};
pub use model::user::{RegistrationRequest, User, UserId};
pub use model::validation::{ValidationError, ValidationRule};
pub use repo::board_repo::{BoardRepository, SqliteBoardRepository};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::{BoardService, CreateBoardRequest, UpdateBoardRequest};
pub use service::comment_service::{CommentService, CreateCommentRequest};
pub use service::error::{ServiceError, ServiceResult};
pub use service::task_service::{CreateTaskRequest, TaskService, UpdateTaskRequest};
pub use service::user_service::UserService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

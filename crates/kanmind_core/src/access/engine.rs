//! Authorization decision table.
//!
//! # Responsibility
//! - Map `(actor, verb, resource)` to `Allow` or `Deny(reason)`.
//!
//! # Invariants
//! - Anonymous actors are denied before any membership lookup.
//! - The first matching rule wins; unmatched combinations are denied.
//! - Only board deletion honours the superuser flag.
//!
//! | Resource | Verb | Rule |
//! |---|---|---|
//! | Board | create | any authenticated actor |
//! | Board | read/update | owner or member |
//! | Board members | update | owner |
//! | Board | delete | owner or superuser |
//! | Task | create/read/update | owner or member of the task board |
//! | Task | delete | task creator or board owner |
//! | Comment | create/read | owner or member of the task board |
//! | Comment | delete | comment author |

use crate::access::identity::Actor;
use crate::access::membership::MembershipResolver;
use crate::model::board::{Board, BoardId};
use crate::model::comment::Comment;
use crate::model::task::Task;
use crate::model::user::UserId;
use crate::repo::RepoResult;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Operation class requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    /// Maps an HTTP method onto a verb. `PUT` counts as an update.
    pub fn from_http_method(method: &str) -> Option<Self> {
        match method.trim().to_ascii_uppercase().as_str() {
            "GET" | "HEAD" | "OPTIONS" => Some(Self::Read),
            "POST" => Some(Self::Create),
            "PATCH" | "PUT" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Board,
    Task,
    Comment,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Task => "task",
            Self::Comment => "comment",
        }
    }
}

/// Target of an authorization check, carrying its owning board directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// `board_id` is `None` for create and list requests.
    Board { board_id: Option<BoardId> },
    /// Explicit member set of an existing board.
    BoardMembers { board_id: BoardId },
    /// `creator_id` is `None` when the task does not exist yet.
    Task {
        board_id: BoardId,
        creator_id: Option<UserId>,
    },
    /// `author_id` is `None` when the comment does not exist yet.
    Comment {
        board_id: BoardId,
        author_id: Option<UserId>,
    },
}

impl Resource {
    /// Board collection: creation and listing.
    pub fn boards() -> Self {
        Self::Board { board_id: None }
    }

    pub fn board(board: &Board) -> Self {
        Self::Board {
            board_id: Some(board.id),
        }
    }

    pub fn board_members(board: &Board) -> Self {
        Self::BoardMembers { board_id: board.id }
    }

    pub fn new_task(board_id: BoardId) -> Self {
        Self::Task {
            board_id,
            creator_id: None,
        }
    }

    pub fn task(task: &Task) -> Self {
        Self::Task {
            board_id: task.board_id,
            creator_id: Some(task.creator_id),
        }
    }

    /// Comment collection under a task: creation and listing.
    pub fn task_comments(task: &Task) -> Self {
        Self::Comment {
            board_id: task.board_id,
            author_id: None,
        }
    }

    pub fn comment(comment: &Comment) -> Self {
        Self::Comment {
            board_id: comment.board_id,
            author_id: Some(comment.author_id),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Board { .. } | Self::BoardMembers { .. } => ResourceKind::Board,
            Self::Task { .. } => ResourceKind::Task,
            Self::Comment { .. } => ResourceKind::Comment,
        }
    }

    /// Board the decision is resolved against, if any.
    pub fn board_id(&self) -> Option<BoardId> {
        match self {
            Self::Board { board_id } => *board_id,
            Self::BoardMembers { board_id }
            | Self::Task { board_id, .. }
            | Self::Comment { board_id, .. } => Some(*board_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    NotBoardMember,
    NotBoardOwner,
    NotTaskCreatorOrBoardOwner,
    NotCommentAuthor,
    /// No rule covers this verb/resource combination.
    NoMatchingRule,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotBoardMember => "not_board_member",
            Self::NotBoardOwner => "not_board_owner",
            Self::NotTaskCreatorOrBoardOwner => "not_task_creator_or_board_owner",
            Self::NotCommentAuthor => "not_comment_author",
            Self::NoMatchingRule => "no_matching_rule",
        }
    }
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    fn require(granted: bool, reason: DenyReason) -> Self {
        if granted {
            Self::Allow
        } else {
            Self::Deny(reason)
        }
    }
}

/// Evaluates the decision table for one request.
///
/// Membership lookups are only performed for rules that need them, so the
/// only error source is the resolver's store.
pub fn authorize<M: MembershipResolver + ?Sized>(
    membership: &M,
    actor: &Actor,
    verb: Verb,
    resource: &Resource,
) -> RepoResult<Decision> {
    let Some(identity) = actor.identity() else {
        return Ok(Decision::Deny(DenyReason::Unauthenticated));
    };
    let user_id = identity.user_id;

    let decision = match (*resource, verb) {
        (Resource::Board { .. }, Verb::Create) => Decision::Allow,
        // List request; the visibility filter narrows the result set.
        (Resource::Board { board_id: None }, Verb::Read) => Decision::Allow,
        (Resource::Board { board_id: Some(board_id) }, Verb::Read | Verb::Update) => {
            Decision::require(
                membership.has_access(board_id, user_id)?,
                DenyReason::NotBoardMember,
            )
        }
        (Resource::Board { board_id: Some(board_id) }, Verb::Delete) => Decision::require(
            membership.is_owner(board_id, user_id)? || identity.is_superuser,
            DenyReason::NotBoardOwner,
        ),
        (Resource::BoardMembers { board_id }, Verb::Update) => Decision::require(
            membership.is_owner(board_id, user_id)?,
            DenyReason::NotBoardOwner,
        ),
        (Resource::Task { board_id, .. }, Verb::Create | Verb::Read | Verb::Update) => {
            Decision::require(
                membership.has_access(board_id, user_id)?,
                DenyReason::NotBoardMember,
            )
        }
        (
            Resource::Task {
                board_id,
                creator_id,
            },
            Verb::Delete,
        ) => Decision::require(
            creator_id == Some(user_id) || membership.is_owner(board_id, user_id)?,
            DenyReason::NotTaskCreatorOrBoardOwner,
        ),
        (Resource::Comment { board_id, .. }, Verb::Create | Verb::Read) => Decision::require(
            membership.has_access(board_id, user_id)?,
            DenyReason::NotBoardMember,
        ),
        (Resource::Comment { author_id, .. }, Verb::Delete) => Decision::require(
            author_id == Some(user_id),
            DenyReason::NotCommentAuthor,
        ),
        _ => Decision::Deny(DenyReason::NoMatchingRule),
    };

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::{authorize, Decision, DenyReason, Resource, ResourceKind, Verb};
    use crate::access::identity::{Actor, Identity};
    use crate::access::membership::MembershipTable;
    use crate::model::board::Board;
    use crate::model::comment::Comment;
    use crate::model::task::Task;
    use uuid::Uuid;

    struct Fixture {
        owner: Actor,
        member: Actor,
        stranger: Actor,
        superuser: Actor,
        board: Board,
        table: MembershipTable,
    }

    fn fixture() -> Fixture {
        let owner = Identity::new(Uuid::new_v4());
        let member = Identity::new(Uuid::new_v4());
        let board = Board::new("Release", owner.user_id, [member.user_id]);
        let table = [&board].into_iter().collect();
        Fixture {
            owner: owner.into(),
            member: member.into(),
            stranger: Identity::new(Uuid::new_v4()).into(),
            superuser: Identity::superuser(Uuid::new_v4()).into(),
            board,
            table,
        }
    }

    fn user_of(actor: &Actor) -> Uuid {
        actor.identity().expect("authenticated actor").user_id
    }

    fn decide(fx: &Fixture, actor: &Actor, verb: Verb, resource: Resource) -> Decision {
        authorize(&fx.table, actor, verb, &resource).expect("in-memory resolver never fails")
    }

    #[test]
    fn http_methods_map_onto_verbs() {
        assert_eq!(Verb::from_http_method("get"), Some(Verb::Read));
        assert_eq!(Verb::from_http_method("POST"), Some(Verb::Create));
        assert_eq!(Verb::from_http_method("PATCH"), Some(Verb::Update));
        assert_eq!(Verb::from_http_method("PUT"), Some(Verb::Update));
        assert_eq!(Verb::from_http_method("DELETE"), Some(Verb::Delete));
        assert_eq!(Verb::from_http_method("TRACE"), None);
    }

    #[test]
    fn anonymous_actor_is_denied_for_every_verb_and_kind() {
        let fx = fixture();
        let task = Task::new(fx.board.id, user_of(&fx.owner), "t");
        let comment = Comment::new(&task, user_of(&fx.owner), "c");
        for resource in [
            Resource::boards(),
            Resource::board(&fx.board),
            Resource::board_members(&fx.board),
            Resource::task(&task),
            Resource::comment(&comment),
        ] {
            for verb in [Verb::Create, Verb::Read, Verb::Update, Verb::Delete] {
                assert_eq!(
                    decide(&fx, &Actor::Anonymous, verb, resource),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
        }
    }

    #[test]
    fn any_authenticated_actor_may_create_and_list_boards() {
        let fx = fixture();
        for verb in [Verb::Create, Verb::Read] {
            assert!(decide(&fx, &fx.stranger, verb, Resource::boards()).is_allowed());
        }
    }

    #[test]
    fn board_read_and_update_require_owner_or_member() {
        let fx = fixture();
        for verb in [Verb::Read, Verb::Update] {
            assert!(decide(&fx, &fx.owner, verb, Resource::board(&fx.board)).is_allowed());
            assert!(decide(&fx, &fx.member, verb, Resource::board(&fx.board)).is_allowed());
            assert_eq!(
                decide(&fx, &fx.stranger, verb, Resource::board(&fx.board)),
                Decision::Deny(DenyReason::NotBoardMember)
            );
        }
    }

    #[test]
    fn board_delete_requires_owner_or_superuser() {
        let fx = fixture();
        let resource = Resource::board(&fx.board);
        assert!(decide(&fx, &fx.owner, Verb::Delete, resource).is_allowed());
        assert!(decide(&fx, &fx.superuser, Verb::Delete, resource).is_allowed());
        assert_eq!(
            decide(&fx, &fx.member, Verb::Delete, resource),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
        assert_eq!(
            decide(&fx, &fx.stranger, Verb::Delete, resource),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
    }

    #[test]
    fn superuser_flag_does_not_open_other_rules() {
        let fx = fixture();
        assert_eq!(
            decide(&fx, &fx.superuser, Verb::Read, Resource::board(&fx.board)),
            Decision::Deny(DenyReason::NotBoardMember)
        );
        assert_eq!(
            decide(&fx, &fx.superuser, Verb::Update, Resource::board_members(&fx.board)),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
    }

    #[test]
    fn only_owner_may_change_member_set() {
        let fx = fixture();
        let resource = Resource::board_members(&fx.board);
        assert!(decide(&fx, &fx.owner, Verb::Update, resource).is_allowed());
        assert_eq!(
            decide(&fx, &fx.member, Verb::Update, resource),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
        assert_eq!(
            decide(&fx, &fx.stranger, Verb::Update, resource),
            Decision::Deny(DenyReason::NotBoardOwner)
        );
        assert_eq!(
            decide(&fx, &fx.owner, Verb::Delete, resource),
            Decision::Deny(DenyReason::NoMatchingRule)
        );
        assert_eq!(resource.kind(), ResourceKind::Board);
        assert_eq!(resource.board_id(), Some(fx.board.id));
    }

    #[test]
    fn task_access_follows_parent_board() {
        let fx = fixture();
        let task = Task::new(fx.board.id, user_of(&fx.owner), "t");
        for verb in [Verb::Read, Verb::Update] {
            assert!(decide(&fx, &fx.member, verb, Resource::task(&task)).is_allowed());
            assert!(!decide(&fx, &fx.stranger, verb, Resource::task(&task)).is_allowed());
        }
        assert!(decide(&fx, &fx.member, Verb::Create, Resource::new_task(fx.board.id)).is_allowed());
        assert!(
            !decide(&fx, &fx.stranger, Verb::Create, Resource::new_task(fx.board.id)).is_allowed()
        );
    }

    #[test]
    fn task_delete_requires_creator_or_board_owner() {
        let fx = fixture();
        let by_owner = Task::new(fx.board.id, user_of(&fx.owner), "owner task");
        let by_member = Task::new(fx.board.id, user_of(&fx.member), "member task");

        assert!(decide(&fx, &fx.owner, Verb::Delete, Resource::task(&by_owner)).is_allowed());
        assert!(decide(&fx, &fx.owner, Verb::Delete, Resource::task(&by_member)).is_allowed());
        assert!(decide(&fx, &fx.member, Verb::Delete, Resource::task(&by_member)).is_allowed());
        assert_eq!(
            decide(&fx, &fx.member, Verb::Delete, Resource::task(&by_owner)),
            Decision::Deny(DenyReason::NotTaskCreatorOrBoardOwner)
        );
    }

    #[test]
    fn comment_rules_follow_board_then_author() {
        let fx = fixture();
        let task = Task::new(fx.board.id, user_of(&fx.owner), "t");
        let comment = Comment::new(&task, user_of(&fx.member), "looks good");
        let collection = Resource::task_comments(&task);

        assert!(decide(&fx, &fx.member, Verb::Create, collection).is_allowed());
        assert!(decide(&fx, &fx.owner, Verb::Read, collection).is_allowed());
        assert!(!decide(&fx, &fx.stranger, Verb::Read, collection).is_allowed());

        assert!(decide(&fx, &fx.member, Verb::Delete, Resource::comment(&comment)).is_allowed());
        assert_eq!(
            decide(&fx, &fx.owner, Verb::Delete, Resource::comment(&comment)),
            Decision::Deny(DenyReason::NotCommentAuthor)
        );
    }

    #[test]
    fn unmatched_combinations_are_denied() {
        let fx = fixture();
        let task = Task::new(fx.board.id, user_of(&fx.owner), "t");
        let comment = Comment::new(&task, user_of(&fx.owner), "c");
        assert_eq!(
            decide(&fx, &fx.owner, Verb::Update, Resource::comment(&comment)),
            Decision::Deny(DenyReason::NoMatchingRule)
        );
        assert_eq!(
            decide(&fx, &fx.owner, Verb::Delete, Resource::boards()),
            Decision::Deny(DenyReason::NoMatchingRule)
        );
    }

    #[test]
    fn resources_report_kind_and_board() {
        let fx = fixture();
        let task = Task::new(fx.board.id, user_of(&fx.owner), "t");
        assert_eq!(Resource::task(&task).kind(), ResourceKind::Task);
        assert_eq!(Resource::task(&task).board_id(), Some(fx.board.id));
        assert_eq!(Resource::boards().board_id(), None);
    }
}

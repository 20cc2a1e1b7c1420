use kanmind_core::db::open_db_in_memory;
use kanmind_core::{
    Actor, BoardRepository, BoardService, CreateBoardRequest, CreateTaskRequest, DenyReason,
    MembershipResolver, ServiceError, SqliteBoardRepository, SqliteTaskRepository,
    SqliteUserRepository, TaskPriority, TaskService, UpdateBoardRequest, User, UserRepository,
    ValidationRule,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn register(conn: &Connection, name: &str) -> (User, Actor) {
    let user = User::new(name, format!("{}@example.com", name.to_lowercase()));
    SqliteUserRepository::new(conn).create_user(&user).unwrap();
    let actor = Actor::from(&user);
    (user, actor)
}

fn register_superuser(conn: &Connection, name: &str) -> Actor {
    let mut user = User::new(name, format!("{}@example.com", name.to_lowercase()));
    user.is_superuser = true;
    SqliteUserRepository::new(conn).create_user(&user).unwrap();
    Actor::from(&user)
}

fn boards(conn: &Connection) -> BoardService<SqliteBoardRepository<'_>, SqliteUserRepository<'_>> {
    BoardService::new(
        SqliteBoardRepository::new(conn),
        SqliteUserRepository::new(conn),
    )
}

fn create_request(title: &str, members: &[&User]) -> CreateBoardRequest {
    CreateBoardRequest {
        title: title.to_string(),
        members: members.iter().map(|user| user.id).collect(),
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn anonymous_board_creation_is_unauthenticated_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();

    let err = boards(&conn)
        .create_board(&Actor::Anonymous, &create_request("Ghost", &[]))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Unauthenticated));
    assert_eq!(err.status_code(), 401);
    assert_eq!(count_rows(&conn, "boards"), 0);
}

#[test]
fn creator_becomes_owner_and_is_not_stored_as_member() {
    let conn = open_db_in_memory().unwrap();
    let (owner, owner_actor) = register(&conn, "Alice");
    let (member, _) = register(&conn, "Bob");

    let summary = boards(&conn)
        .create_board(&owner_actor, &create_request("Launch", &[&owner, &member]))
        .unwrap();

    assert_eq!(summary.owner_id, owner.id);
    assert_eq!(summary.member_count, 1);
    let board = boards(&conn).get_board(&owner_actor, summary.id).unwrap();
    assert!(board.members.contains(&member.id));
    assert!(!board.members.contains(&owner.id));
}

#[test]
fn unknown_member_ids_fail_validation_without_creating_board() {
    let conn = open_db_in_memory().unwrap();
    let (_, owner_actor) = register(&conn, "Alice");
    let ghost = Uuid::new_v4();

    let err = boards(&conn)
        .create_board(
            &owner_actor,
            &CreateBoardRequest {
                title: "Launch".to_string(),
                members: vec![ghost],
            },
        )
        .unwrap_err();

    match err {
        ServiceError::Validation(err) => {
            assert_eq!(err.field, "members");
            assert_eq!(err.rule, ValidationRule::UnknownUser(ghost));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_rows(&conn, "boards"), 0);
}

#[test]
fn blank_title_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let (_, owner_actor) = register(&conn, "Alice");

    let err = boards(&conn)
        .create_board(&owner_actor, &create_request("   ", &[]))
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn board_list_shows_owned_and_member_boards_only() {
    let conn = open_db_in_memory().unwrap();
    let (_, alice) = register(&conn, "Alice");
    let (bob_user, bob) = register(&conn, "Bob");
    let (_, carol) = register(&conn, "Carol");
    let service = boards(&conn);

    let shared = service
        .create_board(&alice, &create_request("Shared", &[&bob_user]))
        .unwrap();
    let private = service
        .create_board(&alice, &create_request("Private", &[]))
        .unwrap();
    let bobs = service
        .create_board(&bob, &create_request("Bob's", &[]))
        .unwrap();

    let ids = |actor: &Actor| -> Vec<Uuid> {
        service
            .list_boards(actor)
            .unwrap()
            .into_iter()
            .map(|board| board.id)
            .collect()
    };

    assert_eq!(ids(&alice), vec![shared.id, private.id]);
    assert_eq!(ids(&bob), vec![shared.id, bobs.id]);
    assert!(ids(&carol).is_empty());
}

#[test]
fn board_read_and_update_allowed_for_members_forbidden_for_strangers() {
    let conn = open_db_in_memory().unwrap();
    let (_, alice) = register(&conn, "Alice");
    let (bob_user, bob) = register(&conn, "Bob");
    let (_, carol) = register(&conn, "Carol");
    let service = boards(&conn);
    let board = service
        .create_board(&alice, &create_request("Roadmap", &[&bob_user]))
        .unwrap();

    service.get_board(&bob, board.id).unwrap();
    let renamed = service
        .update_board(
            &bob,
            board.id,
            &UpdateBoardRequest {
                title: Some("Roadmap 2".to_string()),
                members: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.title, "Roadmap 2");
    assert!(renamed.members.contains(&bob_user.id));

    let err = service.get_board(&carol, board.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            reason: DenyReason::NotBoardMember,
            ..
        }
    ));
    assert_eq!(err.status_code(), 403);
}

#[test]
fn board_delete_allowed_for_owner_and_superuser_only() {
    let conn = open_db_in_memory().unwrap();
    let (_, alice) = register(&conn, "Alice");
    let (bob_user, bob) = register(&conn, "Bob");
    let root = register_superuser(&conn, "Root");
    let service = boards(&conn);

    let first = service
        .create_board(&alice, &create_request("First", &[&bob_user]))
        .unwrap();
    let second = service
        .create_board(&alice, &create_request("Second", &[&bob_user]))
        .unwrap();

    let err = service.delete_board(&bob, first.id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            reason: DenyReason::NotBoardOwner,
            ..
        }
    ));

    service.delete_board(&alice, first.id).unwrap();
    service.delete_board(&root, second.id).unwrap();
    assert_eq!(count_rows(&conn, "boards"), 0);
}

#[test]
fn missing_board_is_not_found_before_authorization() {
    let conn = open_db_in_memory().unwrap();
    let (_, carol) = register(&conn, "Carol");
    let missing = Uuid::new_v4();
    let service = boards(&conn);

    for err in [
        service.get_board(&carol, missing).unwrap_err(),
        service.delete_board(&carol, missing).unwrap_err(),
        service
            .update_board(&carol, missing, &UpdateBoardRequest::default())
            .unwrap_err(),
    ] {
        assert_eq!(err.status_code(), 404);
    }

    let err = service.get_board(&Actor::Anonymous, missing).unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated));
}

#[test]
fn member_replacement_updates_access_immediately() {
    let conn = open_db_in_memory().unwrap();
    let (alice_user, alice) = register(&conn, "Alice");
    let (bob_user, bob) = register(&conn, "Bob");
    let (carol_user, carol) = register(&conn, "Carol");
    let service = boards(&conn);
    let board = service
        .create_board(&alice, &create_request("Roadmap", &[&bob_user]))
        .unwrap();

    let updated = service
        .update_board(
            &alice,
            board.id,
            &UpdateBoardRequest {
                title: None,
                members: Some(vec![carol_user.id, alice_user.id]),
            },
        )
        .unwrap();
    assert_eq!(updated.members.len(), 1);

    let resolver = SqliteBoardRepository::new(&conn);
    assert!(resolver.has_access(board.id, carol_user.id).unwrap());
    assert!(!resolver.has_access(board.id, bob_user.id).unwrap());
    assert!(resolver.is_owner(board.id, alice_user.id).unwrap());
    assert!(!resolver.is_member(board.id, alice_user.id).unwrap());

    service.get_board(&carol, board.id).unwrap();
    assert!(service.get_board(&bob, board.id).is_err());
}

#[test]
fn board_summary_counts_members_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let (_, alice) = register(&conn, "Alice");
    let (bob_user, _) = register(&conn, "Bob");
    let service = boards(&conn);
    let board = service
        .create_board(&alice, &create_request("Roadmap", &[&bob_user]))
        .unwrap();

    let tasks = TaskService::new(
        SqliteTaskRepository::new(&conn),
        SqliteBoardRepository::new(&conn),
    );
    tasks
        .create_task(&alice, &CreateTaskRequest::new(board.id, "plain"))
        .unwrap();
    let mut urgent = CreateTaskRequest::new(board.id, "urgent");
    urgent.priority = Some(TaskPriority::High);
    tasks.create_task(&alice, &urgent).unwrap();

    let summary = service.get_board_summary(&alice, board.id).unwrap();
    assert_eq!(summary.member_count, 1);
    assert_eq!(summary.ticket_count, 2);
    assert_eq!(summary.tasks_to_do_count, 2);
    assert_eq!(summary.tasks_high_prio_count, 1);
}

#[test]
fn deleting_board_cascades_to_tasks_and_comments() {
    let conn = open_db_in_memory().unwrap();
    let (alice_user, alice) = register(&conn, "Alice");
    let service = boards(&conn);
    let board = service
        .create_board(&alice, &create_request("Doomed", &[]))
        .unwrap();

    let task = TaskService::new(
        SqliteTaskRepository::new(&conn),
        SqliteBoardRepository::new(&conn),
    )
    .create_task(&alice, &CreateTaskRequest::new(board.id, "t"))
    .unwrap();
    conn.execute(
        "INSERT INTO comments (id, task_id, board_id, author_id, content, created_at)
         VALUES (?1, ?2, ?3, ?4, 'note', 0);",
        [
            Uuid::new_v4().to_string(),
            task.id.to_string(),
            board.id.to_string(),
            alice_user.id.to_string(),
        ],
    )
    .unwrap();

    service.delete_board(&alice, board.id).unwrap();

    assert_eq!(count_rows(&conn, "tasks"), 0);
    assert_eq!(count_rows(&conn, "comments"), 0);
    assert_eq!(count_rows(&conn, "board_members"), 0);
    assert!(!SqliteBoardRepository::new(&conn)
        .board_exists(board.id)
        .unwrap());
}

#[test]
fn only_owner_may_replace_member_set() {
    let conn = open_db_in_memory().unwrap();
    let (alice_user, alice) = register(&conn, "Alice");
    let (bob_user, bob) = register(&conn, "Bob");
    let (carol_user, _) = register(&conn, "Carol");
    let (dave_user, _) = register(&conn, "Dave");
    let service = boards(&conn);
    let board = service
        .create_board(&alice, &create_request("Roadmap", &[&bob_user, &dave_user]))
        .unwrap();

    let err = service
        .update_board(
            &bob,
            board.id,
            &UpdateBoardRequest {
                title: Some("Hijacked".to_string()),
                members: Some(vec![bob_user.id, carol_user.id]),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden {
            reason: DenyReason::NotBoardOwner,
            ..
        }
    ));
    assert_eq!(err.status_code(), 403);

    let stored = service.get_board(&alice, board.id).unwrap();
    assert_eq!(stored.title, "Roadmap");
    assert_eq!(
        stored.members,
        BTreeSet::from([bob_user.id, dave_user.id])
    );
    let resolver = SqliteBoardRepository::new(&conn);
    assert!(!resolver.has_access(board.id, carol_user.id).unwrap());
    assert!(resolver.has_access(board.id, dave_user.id).unwrap());

    let updated = service
        .update_board(
            &alice,
            board.id,
            &UpdateBoardRequest {
                title: None,
                members: Some(vec![bob_user.id, carol_user.id, alice_user.id]),
            },
        )
        .unwrap();
    assert_eq!(
        updated.members,
        BTreeSet::from([bob_user.id, carol_user.id])
    );
    assert!(!resolver.has_access(board.id, dave_user.id).unwrap());
}

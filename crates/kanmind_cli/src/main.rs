//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `kanmind_core` linkage and database bootstrap.
//! - With `--demo`, walk the owner/member/stranger scenario on an in-memory
//!   database and print each access decision.

use clap::Parser;
use kanmind_core::db::{open_db, open_db_in_memory, Connection};
use kanmind_core::{
    init_logging, Actor, BoardService, CoreConfig, CreateBoardRequest, CreateTaskRequest,
    ServiceResult, SqliteBoardRepository, SqliteTaskRepository, SqliteUserRepository,
    TaskService, TaskStatus, UpdateTaskRequest, User, UserRepository,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kanmind", about = "KanMind core smoke probe", version)]
struct Args {
    /// Database file to bootstrap. Ignored with `--demo`.
    #[arg(long, env = "KANMIND_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Directory for rolling log files; logging stays off when unset.
    #[arg(long, env = "KANMIND_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Run the access-rule walkthrough on an in-memory database.
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = CoreConfig::from_env();
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = Some(log_dir);
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok demo={} version={}",
        args.demo,
        kanmind_core::core_version()
    );

    println!("kanmind_core ping={}", kanmind_core::ping());
    println!("kanmind_core version={}", kanmind_core::core_version());

    if args.demo {
        let conn = open_db_in_memory()?;
        run_demo(&conn)?;
    } else {
        open_db(&config.db_path)?;
        println!("database ready path={}", config.db_path.display());
    }
    Ok(())
}

fn run_demo(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let users = SqliteUserRepository::new(conn);
    let register = |name: &str, email: &str| -> Result<(Actor, User), Box<dyn Error>> {
        let user = User::new(name, email);
        users.create_user(&user)?;
        Ok((Actor::from(&user), user))
    };
    let (a, _) = register("Ada Owner", "a@example.com")?;
    let (b, b_user) = register("Bo Member", "b@example.com")?;
    let (c, _) = register("Cy Stranger", "c@example.com")?;

    let boards = BoardService::new(SqliteBoardRepository::new(conn), users);
    let board = boards.create_board(
        &a,
        &CreateBoardRequest {
            title: "Board 1".to_string(),
            members: vec![b_user.id],
        },
    )?;
    println!("A creates board 1 with member B -> ok");

    let tasks = TaskService::new(
        SqliteTaskRepository::new(conn),
        SqliteBoardRepository::new(conn),
    );
    let mut request = CreateTaskRequest::new(board.id, "T");
    request.assignee_id = Some(b_user.id);
    let task = tasks.create_task(&a, &request)?;
    println!("A creates task T assigned to B -> ok");

    report("C reads T", tasks.get_task(&c, task.id));
    report(
        "B moves T to in-progress",
        tasks.update_task(
            &b,
            task.id,
            &UpdateTaskRequest {
                status: Some(TaskStatus::InProgress),
                ..UpdateTaskRequest::default()
            },
        ),
    );
    report("B deletes T", tasks.delete_task(&b, task.id));
    report("A deletes T", tasks.delete_task(&a, task.id));
    Ok(())
}

fn report<T>(step: &str, outcome: ServiceResult<T>) {
    match outcome {
        Ok(_) => println!("{step} -> allowed"),
        Err(err) => println!("{step} -> {} ({err})", err.status_code()),
    }
}

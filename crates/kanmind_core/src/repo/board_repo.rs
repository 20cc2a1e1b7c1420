//! Board repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist boards with their explicit member sets.
//! - Serve board summaries with derived task counters.
//! - Answer membership questions with keyed lookups.
//!
//! # Invariants
//! - `owner_id` is written on insert only.
//! - Member replacement is atomic with the title update.
//! - Deleting a board cascades to tasks and comments via foreign keys.

use crate::access::membership::MembershipResolver;
use crate::access::visibility::BoardFilter;
use crate::model::board::{Board, BoardId, BoardSummary};
use crate::model::user::UserId;
use crate::repo::{uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;

const BOARD_SUMMARY_SELECT_SQL: &str = "SELECT
    b.id,
    b.title,
    b.owner_id,
    (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.status = 'to-do')
        AS tasks_to_do_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.priority = 'high')
        AS tasks_high_prio_count
FROM boards b";

/// Repository interface for board persistence.
pub trait BoardRepository {
    /// Inserts the board and its explicit members.
    fn create_board(&self, board: &Board) -> RepoResult<BoardId>;
    /// Writes title and replaces the member set. Owner is left untouched.
    fn update_board(&self, board: &Board) -> RepoResult<()>;
    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>>;
    fn board_exists(&self, id: BoardId) -> RepoResult<bool>;
    fn get_board_summary(&self, id: BoardId) -> RepoResult<Option<BoardSummary>>;
    /// Lists boards matching `filter` in creation order.
    fn list_boards(&self, filter: &BoardFilter) -> RepoResult<Vec<BoardSummary>>;
    fn delete_board(&self, id: BoardId) -> RepoResult<()>;
}

/// SQLite-backed board repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn board_members(&self, id: BoardId) -> RepoResult<BTreeSet<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM board_members WHERE board_id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut members = BTreeSet::new();
        while let Some(row) = rows.next()? {
            members.insert(uuid_column(row, "board_members", "user_id")?);
        }
        Ok(members)
    }

    fn exists(&self, sql: &str, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        let found: i64 = self.conn.query_row(
            sql,
            params![board_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(found == 1)
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn create_board(&self, board: &Board) -> RepoResult<BoardId> {
        board.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO boards (id, title, owner_id) VALUES (?1, ?2, ?3);",
            params![
                board.id.to_string(),
                board.title.as_str(),
                board.owner_id.to_string(),
            ],
        )?;
        insert_members(&tx, board)?;
        tx.commit()?;

        Ok(board.id)
    }

    fn update_board(&self, board: &Board) -> RepoResult<()> {
        board.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE boards
             SET
                title = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![board.title.as_str(), board.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("board", board.id));
        }

        tx.execute(
            "DELETE FROM board_members WHERE board_id = ?1;",
            [board.id.to_string()],
        )?;
        insert_members(&tx, board)?;
        tx.commit()?;

        Ok(())
    }

    fn get_board(&self, id: BoardId) -> RepoResult<Option<Board>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, owner_id FROM boards WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let board = Board {
            id: uuid_column(row, "boards", "id")?,
            title: row.get("title")?,
            owner_id: uuid_column(row, "boards", "owner_id")?,
            members: self.board_members(id)?,
        };
        Ok(Some(board))
    }

    fn board_exists(&self, id: BoardId) -> RepoResult<bool> {
        let found: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(found == 1)
    }

    fn get_board_summary(&self, id: BoardId) -> RepoResult<Option<BoardSummary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOARD_SUMMARY_SELECT_SQL} WHERE b.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_summary_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_boards(&self, filter: &BoardFilter) -> RepoResult<Vec<BoardSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SUMMARY_SELECT_SQL}
             WHERE b.owner_id = ?1
                OR EXISTS (
                    SELECT 1 FROM board_members m
                    WHERE m.board_id = b.id AND m.user_id = ?1
                )
             ORDER BY b.rowid ASC;"
        ))?;
        let mut rows = stmt.query([filter.user_id.to_string()])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_summary_row(row)?);
        }
        Ok(boards)
    }

    fn delete_board(&self, id: BoardId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM boards WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("board", id));
        }
        Ok(())
    }
}

impl MembershipResolver for SqliteBoardRepository<'_> {
    fn is_owner(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?1 AND owner_id = ?2);",
            board_id,
            user_id,
        )
    }

    fn is_member(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        self.exists(
            "SELECT EXISTS(
                SELECT 1 FROM board_members WHERE board_id = ?1 AND user_id = ?2
            );",
            board_id,
            user_id,
        )
    }

    fn has_access(&self, board_id: BoardId, user_id: UserId) -> RepoResult<bool> {
        self.exists(
            "SELECT
                EXISTS(SELECT 1 FROM boards WHERE id = ?1 AND owner_id = ?2)
                OR EXISTS(SELECT 1 FROM board_members WHERE board_id = ?1 AND user_id = ?2);",
            board_id,
            user_id,
        )
    }
}

fn insert_members(conn: &Connection, board: &Board) -> RepoResult<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO board_members (board_id, user_id) VALUES (?1, ?2);")?;
    for member in board.members.iter().filter(|member| **member != board.owner_id) {
        stmt.execute(params![board.id.to_string(), member.to_string()])?;
    }
    Ok(())
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<BoardSummary> {
    Ok(BoardSummary {
        id: uuid_column(row, "boards", "id")?,
        title: row.get("title")?,
        owner_id: uuid_column(row, "boards", "owner_id")?,
        member_count: row.get("member_count")?,
        ticket_count: row.get("ticket_count")?,
        tasks_to_do_count: row.get("tasks_to_do_count")?,
        tasks_high_prio_count: row.get("tasks_high_prio_count")?,
    })
}

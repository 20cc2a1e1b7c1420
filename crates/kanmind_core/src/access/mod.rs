//! Authorization core.
//!
//! # Responsibility
//! - Resolve board ownership/membership (`membership`).
//! - Decide `(actor, verb, resource)` triples via one decision table (`engine`).
//! - Derive list predicates for boards and scoped task lists (`visibility`).
//!
//! # Invariants
//! - Decisions are pure functions of current board state.
//! - Task and comment rights are always resolved through their board.
//! - Field validation (e.g. assignee membership) is not part of this module.

pub mod engine;
pub mod identity;
pub mod membership;
pub mod visibility;

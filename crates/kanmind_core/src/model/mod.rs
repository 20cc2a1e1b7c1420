//! Domain model for boards, tasks and comments.
//!
//! # Responsibility
//! - Define the records the authorization core reasons about.
//! - Own field-level invariants (`validate()`), separate from access control.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Tasks and comments carry their board id directly, so access checks never
//!   need a join chain.

pub mod board;
pub mod comment;
pub mod task;
pub mod user;
pub mod validation;

//! Core use-case services.
//!
//! # Responsibility
//! - Run every request through the same order of checks: authentication,
//!   resource lookup, authorization, field validation, then persistence.
//! - Keep callers (HTTP glue, CLI) decoupled from storage details.
//!
//! # Invariants
//! - `NotFound` is reported before `Forbidden`; both before any mutation.
//! - Field validation never changes an access decision.

pub mod board_service;
pub mod comment_service;
pub mod error;
mod guard;
pub mod task_service;
pub mod user_service;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent patch field (`None`) from an explicit `null`
/// (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

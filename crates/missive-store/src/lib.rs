//! # missive-store
//!
//! Local SQLite storage for the Missive client SDK.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for messages,
//! conversations, cached user profiles and group members.  Column updates go
//! through typed field lists so a single `UPDATE` writes every listed column,
//! including empty values.

pub mod conversations;
pub mod database;
pub mod groups;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;

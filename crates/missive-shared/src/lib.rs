//! Types shared by every Missive crate: conversation and message enums, the
//! edit notification wire format and the edit audit record.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::MissiveError;

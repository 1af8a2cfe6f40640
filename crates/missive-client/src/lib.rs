//! # missive-client
//!
//! Message-edit reconciliation for the Missive client SDK.
//!
//! Edits initiated locally ([`EditEngine::edit_message`]) and edits pushed by
//! the server ([`EditEngine::handle_notification`]) converge on the same
//! processing path, which rewrites the stored message, refreshes the
//! conversation's latest-message cache when needed and notifies the
//! application through an injected listener.

pub mod bridge;
pub mod config;
pub mod directory;
pub mod edit;
pub mod error;
pub mod send_state;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::EditConfig;
pub use edit::{Collaborators, EditEngine, EditOutcome};
pub use error::EditError;

/// Install a `tracing` subscriber honouring `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("missive_client=debug,missive_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

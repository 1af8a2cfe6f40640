//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `messages`, `conversations`, `users` and
//! `group_members`.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    conversation_id TEXT NOT NULL,
    client_msg_id   TEXT NOT NULL,
    server_msg_id   TEXT NOT NULL DEFAULT '',
    seq             INTEGER NOT NULL DEFAULT 0,    -- 0 until acknowledged
    status          INTEGER NOT NULL,              -- 1 sending, 2 success, 3 failed
    send_id         TEXT NOT NULL,
    recv_id         TEXT NOT NULL DEFAULT '',
    sender_nickname TEXT NOT NULL DEFAULT '',
    sender_face_url TEXT NOT NULL DEFAULT '',
    session_type    INTEGER NOT NULL,
    content_type    INTEGER NOT NULL,
    content         TEXT NOT NULL DEFAULT '',
    send_time       INTEGER NOT NULL,              -- unix millis
    create_time     INTEGER NOT NULL,              -- unix millis
    ex              TEXT NOT NULL DEFAULT '',      -- latest edit audit (JSON)

    PRIMARY KEY (conversation_id, client_msg_id)
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_seq
    ON messages(conversation_id, seq);
CREATE INDEX IF NOT EXISTS idx_messages_conversation_send_time
    ON messages(conversation_id, send_time DESC);

-- ----------------------------------------------------------------
-- Conversations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    conversation_id      TEXT PRIMARY KEY NOT NULL,
    conversation_type    INTEGER NOT NULL,
    user_id              TEXT NOT NULL DEFAULT '',
    group_id             TEXT NOT NULL DEFAULT '',
    show_name            TEXT NOT NULL DEFAULT '',
    latest_msg           TEXT NOT NULL DEFAULT '',  -- JSON snapshot of the head message
    latest_msg_send_time INTEGER NOT NULL DEFAULT 0
);

-- ----------------------------------------------------------------
-- Users (local directory cache)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    user_id  TEXT PRIMARY KEY NOT NULL,
    nickname TEXT NOT NULL DEFAULT '',
    face_url TEXT NOT NULL DEFAULT ''
);

-- ----------------------------------------------------------------
-- Group members
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS group_members (
    group_id   TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    nickname   TEXT NOT NULL DEFAULT '',
    role_level INTEGER NOT NULL DEFAULT 20,

    PRIMARY KEY (group_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_group_members_role
    ON group_members(group_id, role_level);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}

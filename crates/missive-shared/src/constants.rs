/// Session type of a one-to-one conversation.
pub const SINGLE_CHAT_TYPE: i32 = 1;

/// Session type of a group conversation.
pub const GROUP_CHAT_TYPE: i32 = 3;

/// Nickname recorded when an editor's group membership cannot be found.
pub const UNKNOWN_EDITOR_NICKNAME: &str = "unknown";

/// Path of the edit endpoint on the messaging API.
pub const EDIT_MSG_PATH: &str = "/msg/edit_msg";

/// Default messaging API base URL (local development).
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:10002";

/// Default time an edit request waits for its target message to be acknowledged.
pub const DEFAULT_SYNC_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default timeout of a single HTTP request to the messaging API.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

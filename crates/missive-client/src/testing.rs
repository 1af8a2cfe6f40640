//! In-memory fixtures shared by the crate's unit tests.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use missive_shared::constants::{GROUP_CHAT_TYPE, SINGLE_CHAT_TYPE};
use missive_shared::protocol::TextElem;
use missive_shared::types::{ContentType, MessageStatus, RoleLevel};
use missive_store::{
    Conversation, ConversationField, Database, GroupMember, Message, MessageField,
    Result as StoreResult, StoreError,
};

use crate::config::EditConfig;
use crate::directory::{GroupService, UserDirectory, UserDisplay};
use crate::edit::{
    Collaborators, ConversationChanged, EditEngine, IdentityResolver, LatestMessageCache,
    MessageEditedListener, SyncGate,
};
use crate::send_state::SendTracker;
use crate::store::{EditStore, SharedStore};
use crate::transport::{EditRequest, EditTransport};

fn injected_fault() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, "injected fault"))
}

// ---------------------------------------------------------------------------
// Store with fault injection
// ---------------------------------------------------------------------------

pub struct FaultStore {
    inner: SharedStore,
    pub empty_recent: AtomicBool,
    pub fail_message_updates: AtomicBool,
    pub fail_conversation_updates: AtomicBool,
    pub message_updates: AtomicUsize,
    pub conversation_updates: AtomicUsize,
    seq_reads: AtomicUsize,
    seq_read_budget: AtomicUsize,
}

impl FaultStore {
    fn new(inner: SharedStore) -> Self {
        Self {
            inner,
            empty_recent: AtomicBool::new(false),
            fail_message_updates: AtomicBool::new(false),
            fail_conversation_updates: AtomicBool::new(false),
            message_updates: AtomicUsize::new(0),
            conversation_updates: AtomicUsize::new(0),
            seq_reads: AtomicUsize::new(0),
            seq_read_budget: AtomicUsize::new(usize::MAX),
        }
    }

    /// Let `n` more reads by seq succeed, then fail every one after.
    pub fn fail_seq_reads_after(&self, n: usize) {
        let used = self.seq_reads.load(Ordering::SeqCst);
        self.seq_read_budget.store(used + n, Ordering::SeqCst);
    }
}

impl EditStore for FaultStore {
    fn get_message(&self, conversation_id: &str, client_msg_id: &str) -> StoreResult<Message> {
        self.inner.get_message(conversation_id, client_msg_id)
    }

    fn get_message_by_seq(&self, conversation_id: &str, seq: i64) -> StoreResult<Message> {
        let read = self.seq_reads.fetch_add(1, Ordering::SeqCst);
        if read >= self.seq_read_budget.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }
        self.inner.get_message_by_seq(conversation_id, seq)
    }

    fn update_message_fields(
        &self,
        conversation_id: &str,
        client_msg_id: &str,
        fields: &[MessageField],
    ) -> StoreResult<()> {
        if self.fail_message_updates.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }
        self.message_updates.fetch_add(1, Ordering::SeqCst);
        self.inner
            .update_message_fields(conversation_id, client_msg_id, fields)
    }

    fn get_conversation(&self, conversation_id: &str) -> StoreResult<Conversation> {
        self.inner.get_conversation(conversation_id)
    }

    fn update_conversation_fields(
        &self,
        conversation_id: &str,
        fields: &[ConversationField],
    ) -> StoreResult<()> {
        if self.fail_conversation_updates.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }
        self.conversation_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_conversation_fields(conversation_id, fields)
    }

    fn get_recent_messages(&self, conversation_id: &str, limit: u32) -> StoreResult<Vec<Message>> {
        if self.empty_recent.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        self.inner.get_recent_messages(conversation_id, limit)
    }

    fn get_group_admins_and_owner(&self, group_id: &str) -> StoreResult<Vec<GroupMember>> {
        self.inner.get_group_admins_and_owner(group_id)
    }
}

// ---------------------------------------------------------------------------
// Collaborator fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDirectory {
    users: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeDirectory {
    pub fn add(&self, user_id: &str, nickname: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(user_id.to_string(), nickname.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with_transient_error(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn resolve_user_display(&self, user_id: &str) -> anyhow::Result<UserDisplay> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("directory temporarily unavailable");
        }
        let nickname = self.users.lock().unwrap().get(user_id).cloned();
        match nickname {
            Some(nickname) => Ok(UserDisplay {
                nickname,
                face_url: String::new(),
            }),
            None => anyhow::bail!("unknown user {user_id}"),
        }
    }
}

#[derive(Default)]
pub struct FakeGroups {
    members: Mutex<Vec<GroupMember>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeGroups {
    pub fn add(&self, group_id: &str, user_id: &str, nickname: &str, role: RoleLevel) {
        self.members.lock().unwrap().push(member(group_id, user_id, nickname, role));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with_transient_error(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl GroupService for FakeGroups {
    async fn get_group_members(
        &self,
        group_id: &str,
        user_ids: &[String],
    ) -> anyhow::Result<Vec<GroupMember>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("group service temporarily unavailable");
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.group_id == group_id && user_ids.contains(&m.user_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<EditRequest>>,
    pub fail: AtomicBool,
}

impl RecordingTransport {
    pub fn requests(&self) -> Vec<EditRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EditTransport for RecordingTransport {
    async fn send_edit(&self, request: &EditRequest) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("server responded 500 Internal Server Error");
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct CollectingListener {
    events: Mutex<Vec<String>>,
}

impl CollectingListener {
    /// Poll until at least `n` payloads arrived or a second passed.
    pub async fn wait_for(&self, n: usize) -> Vec<String> {
        for _ in 0..100 {
            {
                let events = self.events.lock().unwrap();
                if events.len() >= n {
                    return events.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events.lock().unwrap().clone()
    }

    /// Give in-flight deliveries a moment, then return everything received.
    pub async fn settled(&self) -> Vec<String> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.events.lock().unwrap().clone()
    }
}

impl MessageEditedListener for CollectingListener {
    fn on_message_edited(&self, payload: String) {
        self.events.lock().unwrap().push(payload);
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub db: SharedStore,
    pub store: Arc<FaultStore>,
    pub tracker: Arc<SendTracker>,
    pub directory: Arc<FakeDirectory>,
    pub groups: Arc<FakeGroups>,
    pub transport: Arc<RecordingTransport>,
    pub listener: Arc<CollectingListener>,
    pub config: EditConfig,
    changes_tx: mpsc::UnboundedSender<ConversationChanged>,
    changes_rx: Mutex<mpsc::UnboundedReceiver<ConversationChanged>>,
}

impl Fixture {
    pub fn new() -> Self {
        let db = SharedStore::new(Database::open_in_memory().unwrap());
        let store = Arc::new(FaultStore::new(db.clone()));
        let tracker = Arc::new(SendTracker::new(store.clone()));
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();

        Self {
            db,
            store,
            tracker,
            directory: Arc::new(FakeDirectory::default()),
            groups: Arc::new(FakeGroups::default()),
            transport: Arc::new(RecordingTransport::default()),
            listener: Arc::new(CollectingListener::default()),
            config: EditConfig {
                sync_wait_timeout: Duration::from_millis(150),
                ..EditConfig::default()
            },
            changes_tx,
            changes_rx: Mutex::new(changes_rx),
        }
    }

    pub fn insert(&self, message: &Message) {
        self.db.with_db(|db| db.insert_message(message)).unwrap();
    }

    pub fn insert_conversation(&self, conversation: &Conversation) {
        self.db
            .with_db(|db| db.upsert_conversation(conversation))
            .unwrap();
    }

    /// Record membership both in the local database and the group service.
    pub fn add_member(&self, group_id: &str, user_id: &str, nickname: &str, role: RoleLevel) {
        self.db
            .with_db(|db| db.upsert_group_member(&member(group_id, user_id, nickname, role)))
            .unwrap();
        self.groups.add(group_id, user_id, nickname, role);
    }

    pub fn gate(&self) -> SyncGate {
        SyncGate::new(
            self.store.clone(),
            self.tracker.clone(),
            self.config.sync_wait_timeout,
        )
    }

    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(
            self.store.clone(),
            self.directory.clone(),
            self.groups.clone(),
        )
    }

    pub fn cache(&self) -> LatestMessageCache {
        LatestMessageCache::new(
            self.store.clone(),
            Some(self.changes_tx.clone()),
            self.config.recent_fetch_limit,
        )
    }

    /// Build an engine logged in as `user_id`.  Needs a Tokio runtime.
    pub fn engine_as(&self, user_id: &str) -> EditEngine {
        EditEngine::new(
            &self.config,
            user_id,
            Collaborators {
                store: self.store.clone(),
                tracker: self.tracker.clone(),
                directory: self.directory.clone(),
                groups: self.groups.clone(),
                transport: self.transport.clone(),
                listener: self.listener.clone(),
                conversation_changes: Some(self.changes_tx.clone()),
            },
        )
    }

    /// Drain the conversation-changed signals received so far.
    pub fn conversation_changes(&self) -> Vec<String> {
        let mut rx = self.changes_rx.lock().unwrap();
        let mut ids = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            ids.push(signal.conversation_id);
        }
        ids
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn member(group_id: &str, user_id: &str, nickname: &str, role: RoleLevel) -> GroupMember {
    GroupMember {
        group_id: group_id.into(),
        user_id: user_id.into(),
        nickname: nickname.into(),
        role_level: role,
    }
}

fn session_type_of(conversation_id: &str) -> i32 {
    if conversation_id.starts_with("sg_") {
        GROUP_CHAT_TYPE
    } else {
        SINGLE_CHAT_TYPE
    }
}

/// An acknowledged text message.
pub fn sent_message(
    conversation_id: &str,
    client_msg_id: &str,
    sender: &str,
    seq: i64,
    send_time: i64,
    text: &str,
) -> Message {
    Message {
        conversation_id: conversation_id.into(),
        client_msg_id: client_msg_id.into(),
        server_msg_id: format!("srv-{client_msg_id}"),
        seq,
        status: MessageStatus::SendSuccess,
        send_id: sender.into(),
        recv_id: String::new(),
        sender_nickname: format!("{sender} (sender)"),
        sender_face_url: String::new(),
        session_type: session_type_of(conversation_id),
        content_type: ContentType::TEXT,
        content: TextElem::wrap(text).unwrap(),
        send_time,
        create_time: send_time,
        ex: String::new(),
    }
}

/// A message the server has not acknowledged yet.
pub fn sending_message(conversation_id: &str, client_msg_id: &str, sender: &str) -> Message {
    Message {
        server_msg_id: String::new(),
        seq: 0,
        status: MessageStatus::Sending,
        ..sent_message(conversation_id, client_msg_id, sender, 0, 1_000, "pending")
    }
}

fn snapshot(latest: Option<&Message>) -> (String, i64) {
    match latest {
        Some(m) => (serde_json::to_string(m).unwrap(), m.send_time),
        None => (String::new(), 0),
    }
}

pub fn single_conversation(conversation_id: &str, latest: Option<&Message>) -> Conversation {
    let (latest_msg, latest_msg_send_time) = snapshot(latest);
    Conversation {
        conversation_id: conversation_id.into(),
        conversation_type: SINGLE_CHAT_TYPE,
        user_id: "bob".into(),
        group_id: String::new(),
        show_name: "Bob".into(),
        latest_msg,
        latest_msg_send_time,
    }
}

pub fn group_conversation(
    conversation_id: &str,
    group_id: &str,
    latest: Option<&Message>,
) -> Conversation {
    let (latest_msg, latest_msg_send_time) = snapshot(latest);
    Conversation {
        conversation_id: conversation_id.into(),
        conversation_type: GROUP_CHAT_TYPE,
        user_id: String::new(),
        group_id: group_id.into(),
        show_name: group_id.into(),
        latest_msg,
        latest_msg_send_time,
    }
}

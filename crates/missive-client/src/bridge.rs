//! Bridge from the notification stream into the edit processor.
//!
//! Each raw payload is decoded and handed to its own task, so a slow
//! collaborator call never holds up the notifications behind it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use missive_shared::protocol::decode_edit_notification;

use crate::edit::EditProcessor;

/// Spawn the bridge loop.  It ends when every sender of `notif_rx` is
/// dropped; in-flight notifications keep running on their own tasks.
pub fn spawn_notification_bridge(
    processor: Arc<EditProcessor>,
    mut notif_rx: mpsc::Receiver<Vec<u8>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Edit notification bridge started");

        while let Some(payload) = notif_rx.recv().await {
            let notification = match decode_edit_notification(&payload) {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, bytes = payload.len(), "Dropping malformed edit notification");
                    continue;
                }
            };

            debug!(
                conversation_id = %notification.conversation_id,
                seq = notification.seq,
                "Edit notification received"
            );

            let processor = processor.clone();
            tokio::spawn(async move {
                if let Err(e) = processor.process(&notification).await {
                    warn!(
                        conversation_id = %notification.conversation_id,
                        seq = notification.seq,
                        error = %e,
                        "Edit notification not applied"
                    );
                }
            });
        }

        info!("Edit notification bridge stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EditStore;
    use crate::testing::{sent_message, single_conversation, Fixture};
    use missive_shared::protocol::{encode_edit_notification, EditNotification, TextElem};
    use missive_shared::types::ContentType;

    #[tokio::test]
    async fn test_bridge_applies_notifications_and_skips_garbage() {
        let fx = Fixture::new();
        let msg = sent_message("si_alice_bob", "m10", "alice", 10, 10_000, "hello");
        fx.insert(&msg);
        fx.insert_conversation(&single_conversation("si_alice_bob", Some(&msg)));
        fx.directory.add("alice", "Alice");
        let engine = fx.engine_as("bob");

        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_notification_bridge(engine.processor(), rx);

        tx.send(b"garbage".to_vec()).await.unwrap();
        let payload = encode_edit_notification(&EditNotification {
            conversation_id: "si_alice_bob".into(),
            seq: 10,
            editor_user_id: "alice".into(),
            edit_time: 5,
            session_type: 1,
            client_msg_id: String::new(),
            new_content: "via bridge".into(),
            content_type: ContentType::TEXT,
            is_admin_edit: false,
        })
        .unwrap();
        tx.send(payload).await.unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(fx.listener.wait_for(1).await.len(), 1);

        let stored = fx.store.get_message("si_alice_bob", "m10").unwrap();
        assert_eq!(TextElem::parse(&stored.content).unwrap().content, "via bridge");
    }
}

//! # Reply Outbox
//!
//! Bridges the synchronous `ReplySink` used by commands to the async `ChatProvider`.
//! Replies are queued on an unbounded channel and delivered in order by `deliver`,
//! which finishes once the outbox is dropped at the end of the invocation.
//!
//! Chat event handlers run inside a shard's sync task, and restarting or shutting
//! down that shard aborts it. `spawn_invocation` detaches the whole invocation so
//! its replies still arrive when the command tears down the shard that delivered it.

use crate::domain::traits::{ChatProvider, ReplySink};
use crate::strings::logs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ReplySink for Outbox {
    fn reply(&self, text: &str) {
        if self.tx.send(text.to_string()).is_err() {
            tracing::warn!("Reply dropped, delivery task is gone: {}", text);
        }
    }
}

/// Drain queued replies into the chat until every sender is gone.
pub async fn deliver(chat: &impl ChatProvider, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(text) = rx.recv().await {
        if let Err(e) = chat.send_message(&text).await {
            tracing::error!("{}", logs::reply_failed(&chat.room_id(), &e));
        }
    }
}

/// Run `dispatch` on the blocking pool and deliver its replies to `chat`,
/// independently of the calling task.
pub fn spawn_invocation<C, F>(chat: C, dispatch: F) -> JoinHandle<()>
where
    C: ChatProvider + 'static,
    F: FnOnce(&dyn ReplySink) + Send + 'static,
{
    tokio::spawn(async move {
        let (sink, replies) = Outbox::channel();
        let dispatch = tokio::task::spawn_blocking(move || dispatch(&sink));
        deliver(&chat, replies).await;
        if let Err(e) = dispatch.await {
            tracing::error!("Dispatch task failed: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct FakeChat {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl FakeChat {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for FakeChat {
        async fn send_message(&self, content: &str) -> Result<String, String> {
            if content == "boom" {
                return Err("rate limited".to_string());
            }
            self.sent.lock().unwrap().push(content.to_string());
            Ok("$event".to_string())
        }

        fn room_id(&self) -> String {
            "!room:x".to_string()
        }
    }

    #[tokio::test]
    async fn test_delivers_in_order_until_dropped() {
        let chat = FakeChat::default();
        let (outbox, rx) = Outbox::channel();
        outbox.reply("first");
        outbox.reply("boom");
        outbox.reply("second");
        drop(outbox);

        deliver(&chat, rx).await;
        assert_eq!(chat.sent(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_replies_survive_abort_of_calling_task() {
        let chat = FakeChat::default();
        let (abort_tx, abort_rx) = std::sync::mpsc::channel::<tokio::task::AbortHandle>();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();

        // Stands in for a sync task whose command restarts its own shard.
        let handler_chat = chat.clone();
        let handler = tokio::spawn(async move {
            let invocation = spawn_invocation(handler_chat, move |sink: &dyn ReplySink| {
                sink.reply("Restarting shard 0...");
                abort_rx.recv().unwrap().abort();
            });
            let _ = started_tx.send(invocation);
            std::future::pending::<()>().await;
        });
        abort_tx.send(handler.abort_handle()).unwrap();

        let invocation = started_rx.await.unwrap();
        assert!(handler.await.unwrap_err().is_cancelled());
        invocation.await.unwrap();
        assert_eq!(chat.sent(), vec!["Restarting shard 0...".to_string()]);
    }
}

//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`,
//! and converts Matrix room messages into the transport-neutral `MessageEvent`.

use crate::domain::traits::ChatProvider;
use crate::domain::types::MessageEvent;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::{
    MessageType, OriginalSyncRoomMessageEvent, RoomMessageEventContent,
};

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| e.to_string())
    }
}

/// Text messages only. A Matrix room hosts its own call, so the room doubles
/// as the sender's voice channel.
pub fn to_message_event(
    ev: &OriginalSyncRoomMessageEvent,
    room: &Room,
    shard_id: usize,
) -> Option<MessageEvent> {
    let MessageType::Text(text) = &ev.content.msgtype else {
        return None;
    };
    let room_id = room.room_id().as_str();
    Some(
        MessageEvent::new(ev.sender.as_str(), room_id, text.body.as_str())
            .in_voice(room_id)
            .on_shard(shard_id),
    )
}

//! # Domain Types
//!
//! Data structures shared between the transport, the dispatch core and the audio side.

use serde::{Deserialize, Serialize};

/// An inbound chat message as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Identity checked against the owner allow-list.
    pub sender: String,
    /// Room the message arrived in; also the audio isolation key.
    pub room_id: String,
    pub body: String,
    /// Voice channel the sender is currently in, if any.
    pub voice_channel: Option<String>,
    /// Transport shard that delivered the event.
    pub shard_id: usize,
}

impl MessageEvent {
    pub fn new(
        sender: impl Into<String>,
        room_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            room_id: room_id.into(),
            body: body.into(),
            voice_channel: None,
            shard_id: 0,
        }
    }

    pub fn in_voice(mut self, channel: impl Into<String>) -> Self {
        self.voice_channel = Some(channel.into());
        self
    }

    pub fn on_shard(mut self, shard_id: usize) -> Self {
        self.shard_id = shard_id;
        self
    }
}

/// A playable track handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub length_ms: u64,
    #[serde(default)]
    pub uri: Option<String>,
}

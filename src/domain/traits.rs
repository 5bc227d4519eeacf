//! # Domain Traits
//!
//! Abstract interfaces for the collaborators around the dispatch core (Chat, Audio, Codec, Shards).
//! Allows for pluggable implementations in the Infrastructure layer and fakes in tests.

use crate::domain::types::Track;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Synchronous reply primitive handed to commands.
///
/// Implementations forward to the transport; the dispatch core never waits on delivery.
pub trait ReplySink: Send + Sync {
    fn reply(&self, text: &str);
}

/// Per-room audio session owned by the audio collaborator.
pub trait AudioSession: Send + Sync {
    fn is_playing(&self) -> bool;

    fn playing_track(&self) -> Option<Track>;

    /// Whether the session is connected to a voice channel.
    fn is_open(&self) -> bool;

    fn open(&self, channel: &str) -> Result<()>;

    fn play(&self, track: Track) -> Result<()>;
}

/// Lookup-or-create access to audio sessions, one per isolation key.
pub trait AudioProvider: Send + Sync {
    fn session(&self, key: &str) -> Arc<dyn AudioSession>;

    /// Existing session for `key`, if any. Never creates one.
    fn find(&self, key: &str) -> Option<Arc<dyn AudioSession>>;

    /// Number of sessions currently playing.
    fn playing_count(&self) -> usize;
}

/// Opaque conversion between a track and a portable string.
pub trait TrackCodec: Send + Sync {
    fn encode(&self, track: &Track) -> Result<String>;

    fn decode(&self, input: &str) -> Result<Track>;
}

/// Connection-level control over the transport shards.
pub trait ShardControl: Send + Sync {
    fn has_shard(&self, id: usize) -> bool;

    fn shard_count(&self) -> usize;

    fn restart(&self, id: usize) -> Result<()>;

    /// Tear down every shard. Idempotent.
    fn shutdown(&self);
}

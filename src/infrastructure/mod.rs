//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, ReplySink, AudioProvider,
//! TrackCodec, ShardControl).

pub mod audio;
pub mod codec;
pub mod matrix;
pub mod outbox;
pub mod shards;

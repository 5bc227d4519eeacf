//! # Audio Sessions
//!
//! In-process audio collaborator: one session per room, each behind its own lock so
//! calls for the same room are serialized while different rooms proceed independently.
//! Streaming is out of scope; a session tracks its voice channel and current track.

use crate::domain::traits::{AudioProvider, AudioSession};
use crate::domain::types::Track;
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SessionState {
    channel: Option<String>,
    track: Option<Track>,
}

#[derive(Debug, Default)]
pub struct RoomSession {
    state: Mutex<SessionState>,
}

impl RoomSession {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioSession for RoomSession {
    fn is_playing(&self) -> bool {
        self.lock().track.is_some()
    }

    fn playing_track(&self) -> Option<Track> {
        self.lock().track.clone()
    }

    fn is_open(&self) -> bool {
        self.lock().channel.is_some()
    }

    fn open(&self, channel: &str) -> Result<()> {
        let mut state = self.lock();
        tracing::info!("Opening audio session in channel {}", channel);
        state.channel = Some(channel.to_string());
        Ok(())
    }

    fn play(&self, track: Track) -> Result<()> {
        let mut state = self.lock();
        let Some(channel) = &state.channel else {
            bail!("cannot play '{}': session is not connected", track.title);
        };
        tracing::info!("Playing '{}' in {}", track.title, channel);
        state.track = Some(track);
        Ok(())
    }
}

/// Session registry keyed by room.
#[derive(Default)]
pub struct AudioSessions {
    sessions: Mutex<HashMap<String, Arc<RoomSession>>>,
}

impl AudioSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Arc<RoomSession>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }
}

impl AudioProvider for AudioSessions {
    fn session(&self, key: &str) -> Arc<dyn AudioSession> {
        self.sessions()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    fn find(&self, key: &str) -> Option<Arc<dyn AudioSession>> {
        self.sessions()
            .get(key)
            .map(|session| session.clone() as Arc<dyn AudioSession>)
    }

    fn playing_count(&self) -> usize {
        self.sessions().values().filter(|s| s.is_playing()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            identifier: "dQw4w9WgXcQ".to_string(),
            title: "Never Gonna Give You Up".to_string(),
            author: "Rick Astley".to_string(),
            length_ms: 213_000,
            uri: None,
        }
    }

    #[test]
    fn test_session_per_room() {
        let audio = AudioSessions::new();
        let a = audio.session("!a:x");
        a.open("!a:x").unwrap();
        a.play(track()).unwrap();

        assert!(audio.session("!a:x").is_playing());
        assert!(!audio.session("!b:x").is_playing());
        assert_eq!(audio.playing_count(), 1);
    }

    #[test]
    fn test_find_does_not_create() {
        let audio = AudioSessions::new();
        assert!(audio.find("!a:x").is_none());
        assert_eq!(audio.session_count(), 0);

        audio.session("!a:x");
        assert!(audio.find("!a:x").is_some());
        assert!(audio.find("!b:x").is_none());
        assert_eq!(audio.session_count(), 1);
    }

    #[test]
    fn test_play_requires_open_session() {
        let audio = AudioSessions::new();
        let session = audio.session("!a:x");
        assert!(session.play(track()).is_err());
        assert!(session.playing_track().is_none());

        session.open("!a:x").unwrap();
        session.play(track()).unwrap();
        assert_eq!(session.playing_track(), Some(track()));
    }
}

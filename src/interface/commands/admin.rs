//! # Admin Command
//!
//! Handles the `admin` (`a`) command group, restricted to configured owners.
//! Subcommands control the connection (shutdown, shard restarts), move tracks
//! between rooms as portable strings (encode, decode), reload the config file
//! and report a short status.

use crate::application::context::CommandContext;
use crate::application::dispatcher::{Command, CommandGroup};
use crate::application::pipeline::{Guard, OwnerGuard};
use crate::application::registry::RegistryError;
use crate::application::state::RunFlag;
use crate::domain::config::ConfigStore;
use crate::domain::traits::{AudioProvider, ShardControl, TrackCodec};
use crate::interface::commands::Services;
use crate::strings::messages;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub fn admin(services: &Services) -> Result<CommandGroup, RegistryError> {
    CommandGroup::new(
        &["admin", "a"],
        vec![Box::new(OwnerGuard::new(services.config.clone())) as Box<dyn Guard>],
        [
            Arc::new(Shutdown {
                running: services.running.clone(),
                shards: services.shards.clone(),
            }) as Arc<dyn Command>,
            Arc::new(ShardRestart {
                shards: services.shards.clone(),
            }) as Arc<dyn Command>,
            Arc::new(Encode {
                audio: services.audio.clone(),
                codec: services.codec.clone(),
            }) as Arc<dyn Command>,
            Arc::new(Decode {
                audio: services.audio.clone(),
                codec: services.codec.clone(),
            }) as Arc<dyn Command>,
            Arc::new(Reload {
                config: services.config.clone(),
            }) as Arc<dyn Command>,
            Arc::new(Status {
                audio: services.audio.clone(),
                shards: services.shards.clone(),
                started_at: services.started_at,
            }) as Arc<dyn Command>,
        ],
    )
}

struct Shutdown {
    running: RunFlag,
    shards: Arc<dyn ShardControl>,
}

impl Command for Shutdown {
    fn names(&self) -> &[&'static str] {
        &["shutdown"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        tracing::warn!("Shutdown requested by {}", ctx.sender());
        ctx.reply(messages::SHUTTING_DOWN);
        self.running.stop();
        self.shards.shutdown();
        Ok(())
    }
}

struct ShardRestart {
    shards: Arc<dyn ShardControl>,
}

impl Command for ShardRestart {
    fn names(&self) -> &[&'static str] {
        &["shardrestart", "sr"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let id = match ctx.arg(0) {
            None => ctx.event().shard_id,
            Some(raw) => {
                let Ok(requested) = raw.parse::<i64>() else {
                    ctx.reply(messages::invalid_integer(raw));
                    return Ok(());
                };
                match usize::try_from(requested) {
                    Ok(id) if self.shards.has_shard(id) => id,
                    _ => {
                        ctx.reply(messages::invalid_shard(requested));
                        return Ok(());
                    }
                }
            }
        };

        ctx.reply(messages::restarting_shard(id));
        self.shards
            .restart(id)
            .with_context(|| format!("restarting shard {id}"))
    }
}

struct Encode {
    audio: Arc<dyn AudioProvider>,
    codec: Arc<dyn TrackCodec>,
}

impl Command for Encode {
    fn names(&self) -> &[&'static str] {
        &["encode"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let playing = self
            .audio
            .find(&ctx.event().room_id)
            .and_then(|session| session.playing_track());
        let Some(track) = playing else {
            ctx.reply(messages::NOTHING_TO_ENCODE);
            return Ok(());
        };
        let encoded = self.codec.encode(&track).context("encoding playing track")?;
        ctx.reply(encoded);
        Ok(())
    }
}

struct Decode {
    audio: Arc<dyn AudioProvider>,
    codec: Arc<dyn TrackCodec>,
}

impl Command for Decode {
    fn names(&self) -> &[&'static str] {
        &["decode"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let Some(input) = ctx.arg(0) else {
            ctx.reply(messages::DECODE_USAGE);
            return Ok(());
        };
        let Some(channel) = ctx.event().voice_channel.as_deref() else {
            ctx.reply(messages::NOT_IN_VOICE);
            return Ok(());
        };

        let track = self.codec.decode(input).context("decoding track string")?;
        let session = self.audio.session(&ctx.event().room_id);
        if !session.is_open() {
            session.open(channel)?;
        }
        session.play(track)
    }
}

struct Reload {
    config: ConfigStore,
}

impl Command for Reload {
    fn names(&self) -> &[&'static str] {
        &["reload"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        match self.config.reload() {
            Ok(()) => ctx.reply(messages::CONFIGS_RELOADED),
            Err(e) => {
                tracing::error!("Reload requested by {} failed: {:#}", ctx.sender(), e);
                ctx.reply(messages::reload_failed(&format!("{e:#}")));
            }
        }
        Ok(())
    }
}

/// Read-only diagnostics. Stands in for the old script-eval escape hatch.
struct Status {
    audio: Arc<dyn AudioProvider>,
    shards: Arc<dyn ShardControl>,
    started_at: DateTime<Utc>,
}

impl Command for Status {
    fn names(&self) -> &[&'static str] {
        &["status"]
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let uptime = format_uptime(Utc::now() - self.started_at);
        let room_playing = self
            .audio
            .find(&ctx.event().room_id)
            .is_some_and(|session| session.is_playing());
        ctx.reply(messages::status_report(
            &uptime,
            self.shards.shard_count(),
            self.audio.playing_count(),
            room_playing,
        ));
        Ok(())
    }
}

fn format_uptime(elapsed: chrono::TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

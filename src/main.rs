#![recursion_limit = "256"]
//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Application: Guard pipelines, Registry, Dispatcher
//! - Infrastructure: Matrix, Shards, Audio, Codec, Outbox
//! - Interface: Command sets
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::SyncRoomMessageEvent,
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::dispatcher::Dispatcher;
use crate::application::state::RunFlag;
use crate::domain::config::{ConfigStore, DEFAULT_CONFIG_PATH};
use crate::domain::traits::ShardControl;
use crate::infrastructure::audio::AudioSessions;
use crate::infrastructure::codec::Base64TrackCodec;
use crate::infrastructure::matrix::{MatrixService, to_message_event};
use crate::infrastructure::outbox;
use crate::infrastructure::shards::SyncShards;
use crate::interface::commands::{self, Services};
use crate::strings::logs;

#[derive(Debug, Parser)]
#[command(name = "cadence", about = "Matrix music bot")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for the session log
    #[arg(long, default_value = "data")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let store = ConfigStore::open(&cli.config)?;
    let config = store.snapshot();

    // 2. Logging Setup
    if !cli.log_dir.exists() {
        fs::create_dir_all(&cli.log_dir).context("Failed to create log directory")?;
    }

    let file_appender = tracing_appender::rolling::never(&cli.log_dir, "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("{}", logs::STARTING);

    // 3. Matrix Login
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("{}", logs::logged_in(&config.services.matrix.username));

    // 4. Collaborators & Commands
    let running = RunFlag::new();
    let shards = Arc::new(SyncShards::new(vec![client.clone()]));
    let services = Services {
        config: store.clone(),
        audio: Arc::new(AudioSessions::new()),
        codec: Arc::new(Base64TrackCodec),
        shards: shards.clone(),
        running: running.clone(),
        started_at: chrono::Utc::now(),
    };

    // A colliding registry is a configuration error; refuse to start.
    let registry = commands::root_registry(&services).context("Invalid command registry")?;
    let root_count = registry.commands().count();
    tracing::info!("{}", logs::commands_registered(root_count, &config.system.prefix));
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        config.system.prefix.clone(),
        running.clone(),
    ));

    // 5. Event Handlers
    let start_time = std::time::SystemTime::now();
    let loop_dispatcher = dispatcher.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let dispatcher = loop_dispatcher.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }
            if original_msg.sender == room.own_user_id() {
                return;
            }

            let Some(event) = to_message_event(original_msg, &room, 0) else {
                return;
            };
            tracing::debug!("Received message from {}: {}", event.sender, event.body);

            // Detached: this handler runs inside the shard's sync task, which
            // `shardrestart` and `shutdown` abort.
            let chat = MatrixService::new(room);
            outbox::spawn_invocation(chat, move |sink| dispatcher.dispatch(&event, sink));
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            let _ = room.join().await;
        }
    });

    // 6. Start Shards
    shards.start_all();

    let ctrl_c_running = running.clone();
    let ctrl_c_shards = shards.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                ctrl_c_running.stop();
                ctrl_c_shards.shutdown();
            }
            Err(e) => tracing::error!("{}", logs::shutdown_fail(&e.to_string())),
        }
    });

    shards.wait_for_shutdown().await;
    tracing::info!("{}", logs::SHUTDOWN);

    // Let replies from the shutdown command reach the room.
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    Ok(())
}

//! # Command Handlers
//!
//! Builds the root command registry from the bot's collaborators.
//! Commands capture the services they need when constructed; nothing is looked up globally.

pub mod admin;

use crate::application::dispatcher::Command;
use crate::application::registry::{CommandRegistry, RegistryError};
use crate::application::state::RunFlag;
use crate::domain::config::ConfigStore;
use crate::domain::traits::{AudioProvider, ShardControl, TrackCodec};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collaborators handed to command constructors.
#[derive(Clone)]
pub struct Services {
    pub config: ConfigStore,
    pub audio: Arc<dyn AudioProvider>,
    pub codec: Arc<dyn TrackCodec>,
    pub shards: Arc<dyn ShardControl>,
    pub running: RunFlag,
    pub started_at: DateTime<Utc>,
}

/// Every root command. Fails on the first name collision.
pub fn root_registry(services: &Services) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register([Arc::new(admin::admin(services)?) as Arc<dyn Command>])?;
    Ok(registry)
}

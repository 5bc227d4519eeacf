//! # Shard Supervisor
//!
//! Each shard is a logged-in Matrix client running its own sync loop task.
//! Restarting a shard aborts its task and spawns a fresh sync; shutdown aborts
//! every task and wakes whoever is waiting in `wait_for_shutdown`.

use crate::domain::traits::ShardControl;
use crate::strings::logs;
use anyhow::{Result, bail};
use matrix_sdk::Client;
use matrix_sdk::config::SyncSettings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct SyncShards {
    clients: Vec<Client>,
    tasks: Mutex<Vec<Option<JoinHandle<()>>>>,
    runtime: Handle,
    closed: AtomicBool,
    stopped: Notify,
}

impl SyncShards {
    /// Must be called from within the tokio runtime.
    pub fn new(clients: Vec<Client>) -> Self {
        let tasks = clients.iter().map(|_| None).collect();
        Self {
            clients,
            tasks: Mutex::new(tasks),
            runtime: Handle::current(),
            closed: AtomicBool::new(false),
            stopped: Notify::new(),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<Option<JoinHandle<()>>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn_sync(&self, id: usize) -> JoinHandle<()> {
        let client = self.clients[id].clone();
        self.runtime.spawn(async move {
            tracing::info!("{}", logs::shard_started(id));
            if let Err(e) = client.sync(SyncSettings::default()).await {
                tracing::error!("{}", logs::shard_stopped(id, &e.to_string()));
            }
        })
    }

    /// Start every shard that is not already running.
    pub fn start_all(&self) {
        let mut tasks = self.tasks();
        for (id, slot) in tasks.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(self.spawn_sync(id));
            }
        }
    }

    pub async fn wait_for_shutdown(&self) {
        self.stopped.notified().await;
    }
}

impl ShardControl for SyncShards {
    fn has_shard(&self, id: usize) -> bool {
        id < self.clients.len()
    }

    fn shard_count(&self) -> usize {
        self.clients.len()
    }

    fn restart(&self, id: usize) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            bail!("shards are shut down");
        }
        if !self.has_shard(id) {
            bail!("no shard with id {id}");
        }
        let mut tasks = self.tasks();
        if let Some(old) = tasks[id].take() {
            old.abort();
        }
        tasks[id] = Some(self.spawn_sync(id));
        tracing::info!("Restarted shard {}", id);
        Ok(())
    }

    fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        for task in self.tasks().iter_mut().filter_map(Option::take) {
            task.abort();
        }
        // Stores a permit if main is not waiting yet.
        self.stopped.notify_one();
    }
}

//! # Log Strings
//!
//! Operator-facing log lines emitted by `main` and the transport adapter.

pub const STARTING: &str = "Starting Cadence...";

pub fn logged_in(user: &str) -> String {
    format!("Logged in as {user}")
}

pub fn commands_registered(count: usize, prefix: &str) -> String {
    format!("Registered {count} root command(s) with prefix '{prefix}'")
}

pub fn shard_started(id: usize) -> String {
    format!("Shard {id} sync loop started")
}

pub fn shard_stopped(id: usize, err: &str) -> String {
    format!("Shard {id} sync loop ended: {err}")
}

pub fn reply_failed(room: &str, err: &str) -> String {
    format!("Failed to deliver reply to {room}: {err}")
}

pub const SHUTDOWN: &str = "Shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

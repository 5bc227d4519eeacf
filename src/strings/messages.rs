//! # Messages
//!
//! Constant strings and format functions for user-facing replies.
//! `{{prefix}}` is replaced with the command prefix when replied.

pub const SUBCOMMANDS_LABEL: &str = "Subcommands:";
pub const INVALID_SUBCOMMAND: &str = "Invalid subcommand!";
pub const GENERIC_FAILURE: &str = "An error occurred!";

// Admin
pub const SHUTTING_DOWN: &str = "Shutting down!";
pub const NOTHING_TO_ENCODE: &str = "a track must be playing to encode it";
pub const DECODE_USAGE: &str = "Usage: {{prefix}}a decode <base64 string>";
pub const NOT_IN_VOICE: &str = "Must be in a voice channel!";
pub const CONFIGS_RELOADED: &str = "Configs reloaded!";

pub fn restarting_shard(id: usize) -> String {
    format!("Restarting shard {id}...")
}

pub fn invalid_shard(id: i64) -> String {
    format!("Invalid shard {id}.")
}

pub fn invalid_integer(input: &str) -> String {
    format!("Invalid input {input}. Must be an integer.")
}

pub fn reload_failed(err: &str) -> String {
    format!("Could not reload configs: {err}")
}

pub fn status_report(
    uptime: &str,
    shards: usize,
    sessions_playing: usize,
    room_playing: bool,
) -> String {
    let room = if room_playing { "playing" } else { "idle" };
    format!(
        "**Uptime**: {uptime}\n**Shards**: {shards}\n\
         **Sessions playing**: {sessions_playing}\n**This room**: {room}"
    )
}

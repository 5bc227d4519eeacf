//! # Interface Layer
//!
//! User-facing command sets registered with the dispatcher.

pub mod commands;

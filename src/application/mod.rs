//! # Application Layer
//!
//! The dispatch core: per-invocation context, guard pipelines, the command
//! registry and the dispatcher that ties them together.

pub mod context;
pub mod dispatcher;
pub mod pipeline;
pub mod registry;
pub mod state;

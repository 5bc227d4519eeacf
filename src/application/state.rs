//! # Run State
//!
//! Process-wide running flag. Created once in `main` and shared by handle.
//! `stop` is the only mutation: the shutdown command and the Ctrl-C handler call it.
//! The dispatcher checks it between invocations, never during one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        if self.0.swap(false, Ordering::AcqRel) {
            tracing::info!("Run flag cleared; no new commands will be accepted");
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

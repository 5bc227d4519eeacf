//! # Guard Pipeline
//!
//! Ordered, short-circuiting precondition chain run before a command's action.
//! Guards run in registration order; the first failure stops the chain and the
//! action never runs. A guard that errors counts as a failure.
//!
//! Guards own their user-facing feedback: the pipeline itself never replies.

use crate::application::context::CommandContext;
use crate::domain::config::ConfigStore;
use anyhow::Result;

/// A pass/fail precondition over a [`CommandContext`].
pub trait Guard: Send + Sync {
    /// `Ok(false)` is an expected rejection, `Err` an internal failure.
    fn check(&self, ctx: &mut CommandContext<'_>) -> Result<bool>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Plain predicates are guards. They only see the context immutably.
impl<F> Guard for F
where
    F: Fn(&CommandContext<'_>) -> Result<bool> + Send + Sync,
{
    fn check(&self, ctx: &mut CommandContext<'_>) -> Result<bool> {
        self(ctx)
    }

    fn name(&self) -> &str {
        "predicate"
    }
}

#[derive(Default)]
pub struct Pipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl Pipeline {
    pub const fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Append a guard; it runs after every guard added before it.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn push_boxed(&mut self, guard: Box<dyn Guard>) {
        self.guards.push(guard);
    }

    /// Run the guards in order. Returns `false` at the first failure.
    pub fn admit(&self, ctx: &mut CommandContext<'_>) -> bool {
        for guard in &self.guards {
            match guard.check(ctx) {
                Ok(true) => continue,
                Ok(false) => {
                    tracing::debug!("Guard '{}' rejected sender '{}'", guard.name(), ctx.sender());
                    return false;
                }
                Err(e) => {
                    tracing::warn!(
                        "Guard '{}' failed for sender '{}': {:#}",
                        guard.name(),
                        ctx.sender(),
                        e
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Run the guards, then `action` exactly once if all of them pass.
    /// Returns whether the action ran.
    pub fn execute<F>(&self, ctx: &mut CommandContext<'_>, action: F) -> bool
    where
        F: FnOnce(&mut CommandContext<'_>),
    {
        if !self.admit(ctx) {
            return false;
        }
        action(ctx);
        true
    }
}

/// Passes iff the sender is in the configured owner list. Silent on failure
/// so unauthorized callers get no hint that the command exists.
pub struct OwnerGuard {
    config: ConfigStore,
}

impl OwnerGuard {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }
}

impl Guard for OwnerGuard {
    fn check(&self, ctx: &mut CommandContext<'_>) -> Result<bool> {
        Ok(self.config.is_owner(ctx.sender()))
    }

    fn name(&self) -> &str {
        "owner"
    }
}

/// Passes iff at least `min` argument tokens remain; otherwise replies with
/// the usage message once.
pub struct ArgumentGuard {
    min: usize,
    usage: String,
}

impl ArgumentGuard {
    pub fn new(min: usize, usage: impl Into<String>) -> Self {
        Self {
            min,
            usage: usage.into(),
        }
    }
}

impl Guard for ArgumentGuard {
    fn check(&self, ctx: &mut CommandContext<'_>) -> Result<bool> {
        if ctx.args().len() >= self.min {
            return Ok(true);
        }
        ctx.reply(&self.usage);
        Ok(false)
    }

    fn name(&self) -> &str {
        "arguments"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::testing::RecordingSink;
    use crate::domain::config::AppConfig;
    use crate::domain::types::MessageEvent;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: Arc<AtomicUsize>, result: Result<bool>) -> impl Guard + 'static {
        let outcome = result.map_err(|e| e.to_string());
        move |_: &CommandContext<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            outcome.clone().map_err(anyhow::Error::msg)
        }
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_short_circuit_on_first_failure() {
        let (g1, g2, g3) = (
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );
        let pipeline = Pipeline::new()
            .guard(counting(g1.clone(), Ok(true)))
            .guard(counting(g2.clone(), Ok(false)))
            .guard(counting(g3.clone(), Ok(true)));

        let event = MessageEvent::new("@a:x", "!r:x", "cmd");
        let sink = RecordingSink::default();
        let mut ctx = CommandContext::new(&event, Vec::new(), &sink, "!");
        let mut ran = 0;
        assert!(!pipeline.execute(&mut ctx, |_| ran += 1));

        assert_eq!(g1.load(Ordering::SeqCst), 1);
        assert_eq!(g2.load(Ordering::SeqCst), 1);
        assert_eq!(g3.load(Ordering::SeqCst), 0);
        assert_eq!(ran, 0);
        assert!(sink.replies().is_empty());
    }

    #[test]
    fn test_action_runs_once_when_all_pass() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .guard(counting(counter.clone(), Ok(true)))
            .guard(counting(counter.clone(), Ok(true)));

        let event = MessageEvent::new("@a:x", "!r:x", "cmd");
        let sink = RecordingSink::default();
        let mut ctx = CommandContext::new(&event, Vec::new(), &sink, "!");
        let mut ran = 0;
        assert!(pipeline.execute(&mut ctx, |_| ran += 1));
        assert_eq!(ran, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_guard_error_fails_closed() {
        let after = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .guard(|_: &CommandContext<'_>| -> Result<bool> { anyhow::bail!("backend down") })
            .guard(counting(after.clone(), Ok(true)));

        let event = MessageEvent::new("@a:x", "!r:x", "cmd");
        let sink = RecordingSink::default();
        let mut ctx = CommandContext::new(&event, Vec::new(), &sink, "!");
        assert!(!pipeline.execute(&mut ctx, |_| panic!("action must not run")));
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert!(sink.replies().is_empty());
    }

    #[test]
    fn test_argument_guard_threshold() {
        let guard = ArgumentGuard::new(2, "Usage: {{prefix}}thing <a> <b>");
        let event = MessageEvent::new("@a:x", "!r:x", "thing");

        for (tokens, expected) in [
            (args(&[]), false),
            (args(&["one"]), false),
            (args(&["one", "two"]), true),
            (args(&["one", "two", "three"]), true),
        ] {
            let sink = RecordingSink::default();
            let mut ctx = CommandContext::new(&event, tokens, &sink, ".");
            assert_eq!(guard.check(&mut ctx).unwrap(), expected);
            if expected {
                assert!(sink.replies().is_empty());
            } else {
                assert_eq!(sink.replies(), vec!["Usage: .thing <a> <b>".to_string()]);
            }
        }
    }

    #[test]
    fn test_owner_guard_is_silent() {
        let config = ConfigStore::with_config("unused.yaml", AppConfig::for_owners(&["@owner:x"]));
        let pipeline = Pipeline::new().guard(OwnerGuard::new(config));
        let sink = RecordingSink::default();

        let stranger = MessageEvent::new("@stranger:x", "!r:x", "a");
        let mut ctx = CommandContext::new(&stranger, Vec::new(), &sink, "!");
        assert!(!pipeline.admit(&mut ctx));

        let owner = MessageEvent::new("@owner:x", "!r:x", "a");
        let mut ctx = CommandContext::new(&owner, Vec::new(), &sink, "!");
        assert!(pipeline.admit(&mut ctx));
        assert!(sink.replies().is_empty());
    }
}

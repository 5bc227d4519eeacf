//! # Dispatcher
//!
//! Resolves inbound messages to commands and drives them through their guard
//! pipeline. Composite commands ([`CommandGroup`]) re-enter the same path for
//! their children after consuming the subcommand token, so nesting is
//! arbitrary and every level runs its own guards.
//!
//! Unknown root commands are ignored silently; ordinary chat is not an error.

use crate::application::context::CommandContext;
use crate::application::pipeline::{ArgumentGuard, Guard, Pipeline};
use crate::application::registry::{CommandRegistry, RegistryError};
use crate::application::state::RunFlag;
use crate::domain::traits::ReplySink;
use crate::domain::types::MessageEvent;
use crate::strings::messages;
use anyhow::Result;
use std::sync::Arc;

static NO_GUARDS: Pipeline = Pipeline::new();

/// A named, aliasable unit of behavior.
pub trait Command: Send + Sync {
    /// Primary name first, then aliases. Never empty once registered.
    fn names(&self) -> &[&'static str];

    fn primary_name(&self) -> &str {
        self.names().first().copied().unwrap_or_default()
    }

    fn pipeline(&self) -> &Pipeline {
        &NO_GUARDS
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()>;
}

/// Run `command` against `ctx`: guards first, then the action.
///
/// Action errors stop here. They are logged and answered with a generic reply.
/// Returns whether the action ran.
pub fn invoke(command: &dyn Command, ctx: &mut CommandContext<'_>) -> bool {
    command.pipeline().execute(ctx, |ctx| {
        if let Err(e) = command.run(ctx) {
            tracing::error!(
                "Command '{}' failed for sender '{}' in '{}': {:#}",
                command.primary_name(),
                ctx.sender(),
                ctx.event().room_id,
                e
            );
            ctx.reply(messages::GENERIC_FAILURE);
        }
    })
}

/// Composite command delegating to a child registry.
pub struct CommandGroup {
    names: &'static [&'static str],
    children: CommandRegistry,
    help: String,
    pipeline: Pipeline,
}

impl CommandGroup {
    /// Builds the group with its guards. `guards` run before the built-in
    /// argument check, which answers an empty invocation with the help line.
    pub fn new<I>(
        names: &'static [&'static str],
        guards: Vec<Box<dyn Guard>>,
        children: I,
    ) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Command>>,
    {
        let mut registry = CommandRegistry::new();
        registry.register(children)?;
        let help = registry.help(messages::SUBCOMMANDS_LABEL);

        let mut pipeline = Pipeline::new();
        for guard in guards {
            pipeline.push_boxed(guard);
        }

        Ok(Self {
            names,
            children: registry,
            pipeline: pipeline.guard(ArgumentGuard::new(1, help.clone())),
            help,
        })
    }
}

impl Command for CommandGroup {
    fn names(&self) -> &[&'static str] {
        self.names
    }

    fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn run(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        // The argument guard guarantees a token here.
        let Some(token) = ctx.arg(0) else {
            ctx.reply(&self.help);
            return Ok(());
        };
        let Some(child) = self.children.resolve(token).cloned() else {
            ctx.reply(messages::INVALID_SUBCOMMAND);
            return Ok(());
        };
        ctx.consume();
        invoke(child.as_ref(), ctx);
        Ok(())
    }
}

/// Top-level entry point from the transport.
pub struct Dispatcher {
    root: CommandRegistry,
    prefix: String,
    running: RunFlag,
}

impl Dispatcher {
    pub fn new(root: CommandRegistry, prefix: impl Into<String>, running: RunFlag) -> Self {
        Self {
            root,
            prefix: prefix.into(),
            running,
        }
    }

    /// Handle one inbound message. All output goes through `sink`.
    pub fn dispatch(&self, event: &MessageEvent, sink: &dyn ReplySink) {
        if !self.running.is_running() {
            tracing::debug!("Ignoring message from '{}': shutting down", event.sender);
            return;
        }

        let Some(body) = event.body.trim().strip_prefix(self.prefix.as_str()) else {
            return;
        };
        let mut tokens = body.split_whitespace().map(str::to_string);
        let Some(name) = tokens.next() else {
            return;
        };
        let Some(command) = self.root.resolve(&name) else {
            return;
        };

        let args: Vec<String> = tokens.collect();
        tracing::info!(
            "Dispatching cmd='{}' args='{}' sender='{}'",
            name,
            args.join(" "),
            event.sender
        );

        let mut ctx = CommandContext::new(event, args, sink, &self.prefix);
        invoke(command.as_ref(), &mut ctx);
    }
}

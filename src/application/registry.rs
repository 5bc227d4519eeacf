//! # Command Registry
//!
//! Maps every name and alias token to the command that declared it.
//! Collisions are rejected when registering, never at dispatch time.

use crate::application::dispatcher::Command;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command token '{token}' is claimed by both '{existing}' and '{incoming}'")]
    Collision {
        token: String,
        existing: String,
        incoming: String,
    },
    #[error("a command was registered without any name")]
    Unnamed,
}

#[derive(Default)]
pub struct CommandRegistry {
    by_token: HashMap<String, Arc<dyn Command>>,
    /// Registration order, for help output.
    ordered: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every command, or none of them if any token collides.
    pub fn register<I>(&mut self, commands: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Command>>,
    {
        let commands: Vec<_> = commands.into_iter().collect();
        let mut staged: HashMap<&str, &Arc<dyn Command>> = HashMap::new();

        for command in &commands {
            let names = command.names();
            if names.is_empty() {
                return Err(RegistryError::Unnamed);
            }
            for &token in names {
                let existing = self
                    .by_token
                    .get(token)
                    .or_else(|| staged.get(token).copied());
                if let Some(existing) = existing {
                    return Err(RegistryError::Collision {
                        token: token.to_string(),
                        existing: existing.primary_name().to_string(),
                        incoming: command.primary_name().to_string(),
                    });
                }
                staged.insert(token, command);
            }
        }

        for command in &commands {
            for &token in command.names() {
                self.by_token.insert(token.to_string(), command.clone());
            }
            self.ordered.push(command.clone());
        }
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, token: &str) -> Option<&Arc<dyn Command>> {
        self.by_token.get(token)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.ordered.iter()
    }

    /// `"<label> name1 name2 ..."` over primary names in registration order.
    pub fn help(&self, label: &str) -> String {
        self.commands().fold(label.to_string(), |mut out, command| {
            out.push(' ');
            out.push_str(command.primary_name());
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::CommandContext;
    use anyhow::Result;

    struct Named(&'static [&'static str]);

    impl Command for Named {
        fn names(&self) -> &[&'static str] {
            self.0
        }

        fn run(&self, _ctx: &mut CommandContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    fn named(names: &'static [&'static str]) -> Arc<dyn Command> {
        Arc::new(Named(names))
    }

    #[test]
    fn test_resolve_every_alias() {
        let admin = named(&["admin", "a"]);
        let play = named(&["play", "p"]);
        let mut registry = CommandRegistry::new();
        registry.register([admin.clone(), play.clone()]).unwrap();

        for token in ["admin", "a"] {
            assert!(Arc::ptr_eq(registry.resolve(token).unwrap(), &admin));
        }
        for token in ["play", "p"] {
            assert!(Arc::ptr_eq(registry.resolve(token).unwrap(), &play));
        }
        assert!(registry.resolve("Admin").is_none());
        assert!(registry.resolve("adm").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_collision_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register([named(&["shardrestart", "sr"])]).unwrap();

        let err = registry.register([named(&["search", "sr"])]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Collision {
                token: "sr".to_string(),
                existing: "shardrestart".to_string(),
                incoming: "search".to_string(),
            }
        );
        assert!(registry.resolve("search").is_none());
    }

    #[test]
    fn test_collision_within_one_batch() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .register([named(&["reload"]), named(&["restart", "reload"])])
            .unwrap_err();
        assert!(matches!(err, RegistryError::Collision { .. }));
        assert!(registry.commands().next().is_none());
        assert!(registry.resolve("reload").is_none());
    }

    #[test]
    fn test_unnamed_rejected() {
        let mut registry = CommandRegistry::new();
        assert_eq!(registry.register([named(&[])]).unwrap_err(), RegistryError::Unnamed);
    }

    #[test]
    fn test_help_uses_primary_names_in_order() {
        let mut registry = CommandRegistry::new();
        registry
            .register([named(&["shutdown"]), named(&["shardrestart", "sr"]), named(&["reload"])])
            .unwrap();
        assert_eq!(registry.help("Subcommands:"), "Subcommands: shutdown shardrestart reload");
    }
}

//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Case-insensitive lookup by name or alias, duplicate detection,
//!   per-command overrides
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use log::info;
use std::time::Duration;

use super::definition::CommandDefinition;
use super::handler::CommandHandler;
use crate::core::config::CommandOverrides;

/// A registered command: its definition plus the handler that runs it
#[derive(Clone)]
pub struct RegisteredCommand {
    pub definition: CommandDefinition,
    pub handler: Arc<dyn CommandHandler>,
}

/// Registry mapping command names and aliases to handlers
///
/// Every name and alias maps to exactly one command. Keys are stored
/// lowercased so lookups are case-insensitive.
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(PingHandler))?;
///
/// if let Some(cmd) = registry.resolve("PING") {
///     assert_eq!(cmd.definition.name, "ping");
/// }
/// ```
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<RegisteredCommand>>,
    /// Canonical names in registration order
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its name and aliases.
    ///
    /// Fails without touching the registry if any of them is already taken.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<()> {
        let definition = handler.definition();
        let mut keys: Vec<String> = Vec::new();
        for name in definition.names() {
            let key = name.to_lowercase();
            if self.commands.contains_key(&key) || keys.contains(&key) {
                bail!(
                    "Command name or alias `{}` (from `{}`) is already registered",
                    key,
                    definition.name
                );
            }
            keys.push(key);
        }

        let canonical = definition.name.to_lowercase();
        let entry = Arc::new(RegisteredCommand { definition, handler });
        for key in keys {
            self.commands.insert(key, Arc::clone(&entry));
        }
        self.order.push(canonical);
        Ok(())
    }

    /// Look up a command by name or alias. Disabled commands do not resolve.
    pub fn resolve(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.commands
            .get(&name.to_lowercase())
            .filter(|cmd| cmd.definition.enabled)
            .cloned()
    }

    /// Apply `enabled` / `cooldown_secs` overrides from configuration
    pub fn apply_overrides(&mut self, overrides: &CommandOverrides) -> Result<()> {
        for name in overrides.commands.keys() {
            let key = name.to_lowercase();
            if !self.order.contains(&key) {
                bail!("commands config refers to unknown command `{}`", name);
            }
        }

        for (name, over) in &overrides.commands {
            let key = name.to_lowercase();
            let Some(current) = self.commands.get(&key) else {
                continue;
            };
            let mut definition = current.definition.clone();
            if let Some(enabled) = over.enabled {
                definition.enabled = enabled;
            }
            if let Some(secs) = over.cooldown_secs {
                definition.cooldown = Duration::from_secs(secs);
            }
            info!(
                "Command override: {} (enabled: {}, cooldown: {:?})",
                definition.name, definition.enabled, definition.cooldown
            );

            let updated = Arc::new(RegisteredCommand {
                definition,
                handler: Arc::clone(&current.handler),
            });
            let names: Vec<String> = updated.definition.names().map(str::to_lowercase).collect();
            for alias in names {
                self.commands.insert(alias, Arc::clone(&updated));
            }
        }
        Ok(())
    }

    /// Enabled commands in registration order
    pub fn commands(&self) -> Vec<Arc<RegisteredCommand>> {
        self.order
            .iter()
            .filter_map(|name| self.resolve(name))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    /// Number of distinct commands, enabled or not
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

//! # Command System
//!
//! Text (prefix) and slash (/) command handling through one pipeline:
//! adapt the event, run the guards, resolve arguments, execute the body.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Unified text and slash dispatch with declarative guards and cooldowns
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 2.0.0: Remove bang commands, slash-only command system
//! - 1.0.0: Initial reorganization with modular command structure

pub mod arguments;
pub mod context;
pub mod cooldown;
pub mod definition;
pub mod dispatcher;
pub mod guards;
pub mod handler;
pub mod handlers;
pub mod invocation;
pub mod registry;
pub mod slash;

pub use arguments::{ArgValue, Arguments};
pub use context::CommandContext;
pub use cooldown::CooldownTable;
pub use definition::{CommandDefinition, CommandOption, OptionKind};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handler::CommandHandler;
pub use handlers::create_all_handlers;
pub use invocation::InvocationContext;
pub use registry::{CommandRegistry, RegisteredCommand};
pub use slash::{
    create_slash_command, create_slash_commands, register_global_commands, register_guild_commands,
};

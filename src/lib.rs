// Core layer - shared types and configuration
pub mod core;

// Platform boundary - events in, replies out
pub mod gateway;

// Features layer - settings, guessing game, interactive flows
pub mod features;

// Application layer
pub mod commands;

#[cfg(test)]
mod test_support;

pub use core::Config;
pub use commands::{CommandContext, CommandRegistry, Dispatcher};

//! # Core Module
//!
//! Core domain types, configuration, and error handling for the bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial creation with config, error, embed and reply modules

pub mod config;
pub mod embeds;
pub mod error;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use embeds::{colors, Embed};
pub use error::{ArgumentError, GameError, Rejection};
pub use response::{truncate, truncate_for_embed, truncate_for_message, Reply, EMBED_LIMIT, MESSAGE_LIMIT};

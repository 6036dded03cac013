//! # Features
//!
//! Feature modules the command handlers build on.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 2.0.0: Guild settings, guessing game and interactive flows

pub mod guessing;
pub mod interactive;
pub mod settings;

pub use guessing::{GuessingService, RemoteGuessingService};
pub use interactive::{ConfirmFlow, GuessingFlow, ResponseWaiter};
pub use settings::{AuditLog, MemorySettingsStore, SettingsStore, SqliteSettingsStore};

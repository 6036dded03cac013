//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: One handler per command, shared between text and slash invocations
//! - 1.0.0: Initial extraction from monolithic command handler

pub mod akinator;
pub mod config;
pub mod help;
pub mod kick;
pub mod ping;
pub mod whois;

use std::sync::Arc;

use super::handler::CommandHandler;

/// Create all command handlers
///
/// The guessing game is only included when a guessing service is configured.
pub fn create_all_handlers(guessing_enabled: bool) -> Vec<Arc<dyn CommandHandler>> {
    let mut handlers: Vec<Arc<dyn CommandHandler>> = vec![
        Arc::new(kick::KickHandler),
        Arc::new(whois::WhoisHandler),
        Arc::new(help::HelpHandler),
        Arc::new(ping::PingHandler),
        Arc::new(config::ConfigHandler),
    ];
    if guessing_enabled {
        handlers.push(Arc::new(akinator::AkinatorHandler));
    }
    handlers
}

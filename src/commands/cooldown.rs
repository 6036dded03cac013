//! # Feature: Command Cooldowns
//!
//! Per (command, user) cooldown table. Each entry stores the instant the
//! cooldown expires; entries past their expiry count as absent and are
//! overwritten on the next successful invocation rather than swept.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::gateway::UserId;

/// Composite key: (command name, invoker)
type CooldownKey = (String, UserId);

#[derive(Default)]
pub struct CooldownTable {
    expiries: DashMap<CooldownKey, Instant>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(command: &str, user: UserId) -> CooldownKey {
        (command.to_lowercase(), user)
    }

    /// Time left on an active cooldown, if any
    pub fn remaining(&self, command: &str, user: UserId) -> Option<Duration> {
        let expiry = *self.expiries.get(&Self::make_key(command, user))?;
        let now = Instant::now();
        (expiry > now).then(|| expiry - now)
    }

    /// Start a cooldown unless one is active.
    ///
    /// On success the entry is written or refreshed to now + `duration`.
    /// A zero duration never blocks and never writes.
    pub fn try_acquire(&self, command: &str, user: UserId, duration: Duration) -> Result<(), Duration> {
        if duration.is_zero() {
            return Ok(());
        }

        let now = Instant::now();
        let mut entry = self
            .expiries
            .entry(Self::make_key(command, user))
            .or_insert(now);

        if *entry > now {
            return Err(*entry - now);
        }
        *entry = now + duration;
        Ok(())
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}

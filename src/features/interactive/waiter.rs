//! Response waiter.
//!
//! Suspends a flow until a specific user sends a message in a channel or
//! reacts to a message, or until a timeout elapses. Each wait registers one
//! listener which is removed on every exit path, including the waiting
//! future being dropped.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use log::{debug, trace};
use tokio::sync::oneshot;

use crate::gateway::{
    ChannelId, InboundEvent, IncomingMessage, IncomingReaction, MessageId, UserId,
};

/// Where the awaited event must happen. A channel scope waits for messages,
/// a message scope waits for reactions on that message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitScope {
    Channel(ChannelId),
    Message(MessageId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaitedEvent {
    Message(IncomingMessage),
    Reaction(IncomingReaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WaitKey {
    scope: WaitScope,
    user: UserId,
}

type Filter = Box<dyn Fn(&WaitedEvent) -> bool + Send + Sync>;

struct Listener {
    id: u64,
    filter: Filter,
    sender: oneshot::Sender<WaitedEvent>,
}

#[derive(Default)]
pub struct ResponseWaiter {
    listeners: DashMap<WaitKey, Vec<Listener>>,
    next_id: AtomicU64,
}

/// Removes its listener when dropped
struct Registration<'a> {
    waiter: &'a ResponseWaiter,
    key: WaitKey,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.waiter.remove_listener(self.key, self.id);
    }
}

impl ResponseWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the first event from `user` in `scope` that passes `filter`.
    ///
    /// Returns `None` when `timeout` elapses first.
    pub async fn await_response<F>(
        &self,
        scope: WaitScope,
        user: UserId,
        filter: F,
        timeout: Duration,
    ) -> Option<WaitedEvent>
    where
        F: Fn(&WaitedEvent) -> bool + Send + Sync + 'static,
    {
        let key = WaitKey { scope, user };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        self.listeners.entry(key).or_default().push(Listener {
            id,
            filter: Box::new(filter),
            sender,
        });
        let _registration = Registration { waiter: self, key, id };
        trace!("Waiting on {:?} for user {} ({:?})", scope, user.0, timeout);

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(event)) => Some(event),
            Ok(Err(_)) => None,
            Err(_) => {
                debug!("Wait on {:?} for user {} timed out", scope, user.0);
                None
            }
        }
    }

    /// Next message from `user` in `channel`
    pub async fn await_message(
        &self,
        channel: ChannelId,
        user: UserId,
        timeout: Duration,
    ) -> Option<IncomingMessage> {
        match self
            .await_response(WaitScope::Channel(channel), user, |_| true, timeout)
            .await?
        {
            WaitedEvent::Message(message) => Some(message),
            WaitedEvent::Reaction(_) => None,
        }
    }

    /// Next reaction by `user` on `message` using one of `allowed`
    pub async fn await_reaction(
        &self,
        message: MessageId,
        user: UserId,
        allowed: &[&str],
        timeout: Duration,
    ) -> Option<IncomingReaction> {
        let allowed: Vec<String> = allowed.iter().map(|e| e.to_string()).collect();
        let filter = move |event: &WaitedEvent| match event {
            WaitedEvent::Reaction(reaction) => allowed.iter().any(|e| *e == reaction.emoji),
            WaitedEvent::Message(_) => false,
        };
        match self
            .await_response(WaitScope::Message(message), user, filter, timeout)
            .await?
        {
            WaitedEvent::Reaction(reaction) => Some(reaction),
            WaitedEvent::Message(_) => None,
        }
    }

    /// Hand an inbound event to the first matching listener.
    ///
    /// Returns `true` when a waiting flow consumed the event.
    pub fn deliver(&self, event: &InboundEvent) -> bool {
        let (key, waited) = match event {
            InboundEvent::Message(message) => (
                WaitKey {
                    scope: WaitScope::Channel(message.channel_id),
                    user: message.author.id,
                },
                WaitedEvent::Message(message.clone()),
            ),
            InboundEvent::Reaction(reaction) => (
                WaitKey {
                    scope: WaitScope::Message(reaction.message_id),
                    user: reaction.user_id,
                },
                WaitedEvent::Reaction(reaction.clone()),
            ),
            InboundEvent::Interaction(_) => return false,
        };

        let listener = {
            let Some(mut listeners) = self.listeners.get_mut(&key) else {
                return false;
            };
            let position = listeners
                .iter()
                .position(|l| !l.sender.is_closed() && (l.filter)(&waited));
            position.map(|index| listeners.remove(index))
        };
        self.listeners.remove_if(&key, |_, listeners| listeners.is_empty());

        match listener {
            Some(listener) => {
                trace!("Delivered event to listener {}", listener.id);
                listener.sender.send(waited).is_ok()
            }
            None => false,
        }
    }

    /// Number of listeners currently registered
    pub fn pending_count(&self) -> usize {
        self.listeners.iter().map(|entry| entry.value().len()).sum()
    }

    fn remove_listener(&self, key: WaitKey, id: u64) {
        if let Some(mut listeners) = self.listeners.get_mut(&key) {
            listeners.retain(|l| l.id != id);
        }
        self.listeners.remove_if(&key, |_, listeners| listeners.is_empty());
    }
}

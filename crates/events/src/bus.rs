//! Shell event publishing/subscription abstraction (mechanics only).
//!
//! The bus is the one explicit channel through which shell components tell
//! the rest of the application that something changed: the environment mode
//! flipped, a session ended, a user was provisioned. Nothing else is shared
//! globally; a consumer that wants to react subscribes here.
//!
//! - **Broadcast**: every subscription receives every message published after
//!   it subscribed.
//! - **Ordered per publisher**: messages from one publisher arrive in publish
//!   order.
//! - **No persistence**: late subscribers do not see earlier messages.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to a message stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// while let Ok(event) = subscription.try_recv() {
///     apply(event);
/// }
/// ```
///
/// Subscriptions are meant for a single consumer.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain every message currently queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic pub/sub contract.
///
/// `publish()` can fail (e.g. a poisoned lock). Shell components treat a
/// failed publish as a logged warning, never as a reason to abort the
/// operation that produced the message.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}

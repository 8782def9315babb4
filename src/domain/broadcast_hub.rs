//! Fan-out of encoded envelopes to live subscribers.
//!
//! [`BroadcastHub`] keeps one bounded [`tokio::sync::mpsc`] channel per
//! subscriber in a registry guarded by a mutex. Publishing never waits on
//! a subscriber: a channel that is full or closed is dropped from the
//! registry on the spot, and the client is expected to reconnect and
//! resync from a fresh `initial` snapshot.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::envelope::{Envelope, Frame, encode};
use super::Message;
use crate::error::BoardError;

/// Default interval between keep-alive frames.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Identifier of one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Lifecycle of a [`Subscription`]. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Registered, `initial` snapshot queued but not yet taken.
    Connecting,
    /// The `initial` snapshot has been taken; incremental frames follow.
    Active,
    /// Deregistered, disconnected, or dropped after a failed push.
    Closed,
}

#[derive(Debug)]
struct HubInner {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<Frame>>>,
    next_id: AtomicU64,
    buffer: usize,
}

/// Registry of subscriber channels.
///
/// Cheap to clone; all clones share one registry.
///
/// # Concurrency
///
/// Registration, deregistration and publish all run under the same
/// registry mutex, so a subscriber is never pushed to after
/// [`BroadcastHub::unregister`] returns. The mutex is never held across an
/// `.await`.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// Creates a hub whose subscriber channels hold up to `buffer` frames.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Registers a new subscriber and queues an `initial` envelope built
    /// from `snapshot` (expected newest-first) as its first frame.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Internal`] if the snapshot cannot be encoded.
    pub fn register(&self, snapshot: Vec<Message>) -> Result<Subscription, BoardError> {
        let count = snapshot.len();
        let initial = encode(&Envelope::Initial { messages: snapshot })
            .map_err(|e| BoardError::Internal(e.to_string()))?;

        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.inner.buffer);
        sender
            .try_send(initial)
            .map_err(|e| BoardError::Transport(e.to_string()))?;

        let total = {
            let mut subscribers = self.subscribers();
            subscribers.insert(id, sender);
            subscribers.len()
        };
        tracing::debug!(
            subscriber_id = %id,
            messages = count,
            subscribers = total,
            "subscriber registered"
        );

        Ok(Subscription {
            id,
            receiver,
            hub: self.clone(),
            state: SubscriptionState::Connecting,
        })
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers().remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber_id = %id, "subscriber unregistered");
        }
        removed
    }

    /// Encodes `envelope` once and pushes it to every subscriber.
    ///
    /// Returns the number of subscribers that accepted the frame.
    pub fn publish(&self, envelope: &Envelope) -> usize {
        match encode(envelope) {
            Ok(frame) => self.push(&frame),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    event = envelope.type_str(),
                    "envelope encoding failed"
                );
                0
            }
        }
    }

    /// Pushes a keep-alive frame to every subscriber.
    ///
    /// Returns the number of subscribers that accepted the frame.
    pub fn heartbeat(&self) -> usize {
        self.push(&Frame::KeepAlive)
    }

    /// Closes every subscription. Streams end once their queued frames
    /// are drained.
    pub fn close_all(&self) {
        let closed = {
            let mut subscribers = self.subscribers();
            let closed = subscribers.len();
            subscribers.clear();
            closed
        };
        tracing::info!(closed, "all subscriptions closed");
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Returns `true` if `id` is currently registered.
    #[must_use]
    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.subscribers().contains_key(&id)
    }

    /// Spawns a task that calls [`BroadcastHub::heartbeat`] every `period`.
    ///
    /// The first keep-alive goes out one full `period` after spawning.
    #[must_use]
    pub fn spawn_heartbeat(&self, period: Duration) -> JoinHandle<()> {
        let hub = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let delivered = hub.heartbeat();
                tracing::trace!(delivered, "heartbeat sent");
            }
        })
    }

    fn push(&self, frame: &Frame) -> usize {
        let mut delivered = 0;
        self.subscribers()
            .retain(|id, sender| match sender.try_send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    let err = BoardError::Transport("subscriber buffer full".to_string());
                    tracing::warn!(subscriber_id = %id, error = %err, "dropping slow subscriber");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(subscriber_id = %id, "dropping disconnected subscriber");
                    false
                }
            });
        delivered
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<Frame>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(64)
    }
}

/// One live subscription: a stream of [`Frame`]s.
///
/// The first frame is always the `initial` envelope. Dropping the handle
/// deregisters it from the hub, which is how a client disconnect is
/// observed.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Frame>,
    hub: BroadcastHub,
    state: SubscriptionState,
}

impl Subscription {
    /// Returns the subscriber id.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Deregisters from the hub. Safe to call more than once.
    pub fn close(&mut self) {
        self.hub.unregister(self.id);
        self.receiver.close();
        self.state = SubscriptionState::Closed;
    }
}

impl Stream for Subscription {
    type Item = Frame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        let this = self.get_mut();
        if this.state == SubscriptionState::Closed {
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(frame)) => {
                if this.state == SubscriptionState::Connecting {
                    this.state = SubscriptionState::Active;
                }
                Poll::Ready(Some(frame))
            }
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

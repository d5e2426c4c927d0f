//! Live Feed Broadcasting
//!
//! Single-writer, multi-reader channel that replays the most recent item to
//! every new subscriber before continuing with items published after it
//! attached. Backs the `/stream` endpoints of the movie-info and review
//! services.
//!
//! ## Architecture
//!
//! - tokio broadcast channel for fan-out; `publish` never waits on readers
//! - the latest-item slot and the sender sit behind one mutex, so a
//!   subscriber attaching concurrently with a publish either replays that
//!   item or receives it live, never both and never neither
//! - each subscriber buffers at most `capacity` items; a subscriber that
//!   falls further behind loses the oldest ones and resumes with the next
//!   still-buffered item

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

struct Slot<T> {
    latest: Option<T>,
    tx: broadcast::Sender<T>,
}

/// Broadcast channel with replay of the latest item.
pub struct BroadcastChannel<T> {
    name: &'static str,
    slot: Mutex<Slot<T>>,
}

impl<T> BroadcastChannel<T>
where
    T: Clone + Send + 'static,
{
    /// Create a channel buffering up to `capacity` items per subscriber.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            name,
            slot: Mutex::new(Slot { latest: None, tx }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // Neither critical section can leave the slot half-written.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `item` as the latest and deliver it to every attached subscriber.
    pub fn publish(&self, item: T) {
        let mut slot = self.lock();
        slot.latest = Some(item.clone());
        match slot.tx.send(item) {
            Ok(receivers) => {
                debug!(channel = self.name, receivers, "Published item");
            }
            Err(_) => {
                debug!(channel = self.name, "Published item with no subscribers");
            }
        }
    }

    /// Attach a new subscriber.
    ///
    /// Its first delivery is the latest item, if any was published.
    pub fn subscribe(&self) -> Subscription<T> {
        let slot = self.lock();
        let subscription = Subscription {
            channel: self.name,
            replay: slot.latest.clone(),
            rx: slot.tx.subscribe(),
        };
        debug!(
            channel = self.name,
            subscribers = slot.tx.receiver_count(),
            replay = subscription.replay.is_some(),
            "Subscriber attached"
        );
        subscription
    }

    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().tx.receiver_count()
    }
}

/// One subscriber's cursor into a [`BroadcastChannel`].
///
/// Dropping it detaches the subscriber and releases whatever it had buffered.
pub struct Subscription<T> {
    channel: &'static str,
    replay: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + 'static,
{
    /// Next item, waiting for a publish if none is buffered.
    ///
    /// Returns `None` only once the channel itself has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(item) = self.replay.take() {
            return Some(item);
        }
        loop {
            match self.rx.recv().await {
                Ok(item) => return Some(item),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(channel = self.channel, skipped, "Subscriber lagged, oldest items dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next item if one is already buffered.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(item) = self.replay.take() {
            return Some(item);
        }
        loop {
            match self.rx.try_recv() {
                Ok(item) => return Some(item),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(channel = self.channel, skipped, "Subscriber lagged, oldest items dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Lazy, unending stream of the replayed item followed by live items.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        let Subscription {
            channel,
            replay,
            rx,
        } = self;
        let live = BroadcastStream::new(rx).filter_map(move |result| match result {
            Ok(item) => Some(item),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(channel, skipped, "Subscriber lagged, oldest items dropped");
                None
            }
        });
        tokio_stream::iter(replay).chain(live)
    }
}

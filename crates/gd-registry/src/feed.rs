//! Position fan-out to per-responder subscribers.
//!
//! Every heartbeat is published to each live [`PositionSubscription`] for
//! that responder.  A subscription is a scoped handle: dropping it
//! unregisters it, so no listener outlives its owner.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

use gd_core::{Coordinate, ResponderId, Tick};
use gd_zone::{ZoneKey, lock};

/// One position sample as delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionUpdate {
    pub responder: ResponderId,
    pub position:  Coordinate,
    pub zone:      ZoneKey,
    pub tick:      Tick,
}

#[derive(Default)]
struct FeedInner {
    next_id:     u64,
    subscribers: HashMap<ResponderId, Vec<(u64, Sender<PositionUpdate>)>>,
}

#[derive(Default)]
pub(crate) struct PositionFeed {
    inner: Mutex<FeedInner>,
}

impl PositionFeed {
    pub(crate) fn subscribe(self: &Arc<Self>, responder: ResponderId) -> PositionSubscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.entry(responder).or_default().push((id, tx));
        PositionSubscription { responder, id, rx, feed: Arc::downgrade(self) }
    }

    /// Deliver `update` to every subscriber of its responder.
    pub(crate) fn publish(&self, update: &PositionUpdate) {
        let mut inner = lock(&self.inner);
        let Some(subs) = inner.subscribers.get_mut(&update.responder) else {
            return;
        };
        // A failed send means the receiver is gone; prune it.
        subs.retain(|(_, tx)| tx.send(update.clone()).is_ok());
        if subs.is_empty() {
            inner.subscribers.remove(&update.responder);
        }
    }

    fn unsubscribe(&self, responder: ResponderId, id: u64) {
        let mut inner = lock(&self.inner);
        if let Some(subs) = inner.subscribers.get_mut(&responder) {
            subs.retain(|(sid, _)| *sid != id);
            if subs.is_empty() {
                inner.subscribers.remove(&responder);
            }
        }
    }

    pub(crate) fn subscriber_count(&self, responder: ResponderId) -> usize {
        lock(&self.inner).subscribers.get(&responder).map_or(0, Vec::len)
    }
}

/// A live stream of one responder's positions.
///
/// Unregisters from the registry when dropped.
pub struct PositionSubscription {
    responder: ResponderId,
    id:        u64,
    rx:        Receiver<PositionUpdate>,
    feed:      Weak<PositionFeed>,
}

impl PositionSubscription {
    #[inline]
    pub fn responder(&self) -> ResponderId {
        self.responder
    }

    /// All samples received since the last call, oldest first.  Never blocks.
    pub fn drain(&self) -> Vec<PositionUpdate> {
        self.rx.try_iter().collect()
    }
}

impl Drop for PositionSubscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.unsubscribe(self.responder, self.id);
        }
    }
}

impl std::fmt::Debug for PositionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionSubscription")
            .field("responder", &self.responder)
            .field("id", &self.id)
            .finish()
    }
}

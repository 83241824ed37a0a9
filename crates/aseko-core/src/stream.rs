// ── Reactive unit streams ──
//
// Subscription types for consuming unit map replacements from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::UnitMap;

/// One successful refresh as seen by a subscriber.
#[derive(Debug, Clone)]
pub struct UnitUpdate {
    /// The new map.
    pub units: Arc<UnitMap>,
    /// Serials present now but not in the previous map.
    pub added: Vec<String>,
    /// Serials present before but absent now. These units are gone.
    pub removed: Vec<String>,
}

impl UnitUpdate {
    /// Diff two maps by serial number.
    pub fn between(previous: &UnitMap, units: Arc<UnitMap>) -> Self {
        let added = units
            .keys()
            .filter(|sn| !previous.contains_key(*sn))
            .cloned()
            .collect();
        let removed = previous
            .keys()
            .filter(|sn| !units.contains_key(*sn))
            .cloned()
            .collect();
        Self {
            units,
            added,
            removed,
        }
    }

    /// Returns `true` if the set of serials changed.
    pub fn membership_changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// A subscription to the coordinator's unit map.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
/// Dropping it unsubscribes.
pub struct UnitStream {
    current: Arc<UnitMap>,
    receiver: watch::Receiver<Arc<UnitMap>>,
}

impl UnitStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<UnitMap>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The map as of the last observed refresh.
    pub fn current(&self) -> &Arc<UnitMap> {
        &self.current
    }

    /// Get the latest map (may have changed since the last `changed()`).
    pub fn latest(&self) -> Arc<UnitMap> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next successful refresh.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<UnitUpdate> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        let update = UnitUpdate::between(&self.current, Arc::clone(&snap));
        self.current = snap;
        Some(update)
    }

    /// Convert into a `Stream` of maps, starting with the current one.
    pub fn into_stream(self) -> UnitWatchStream {
        UnitWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct UnitWatchStream {
    inner: WatchStream<Arc<UnitMap>>,
}

impl Stream for UnitWatchStream {
    type Item = Arc<UnitMap>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Unit snapshot store ──
//
// Single-writer, copy-on-success holder for the latest unit map.
// The map is only ever replaced wholesale, so readers never observe a
// partially applied refresh.

use std::collections::BTreeMap;
use std::sync::Arc;

use aseko_api::UnitSnapshot;
use tokio::sync::watch;

use crate::stream::UnitStream;

/// Serial number -> latest snapshot, ordered by serial.
pub type UnitMap = BTreeMap<String, Arc<UnitSnapshot>>;

/// Holds the exposed unit map and broadcasts every replacement.
pub struct UnitStore {
    snapshot: watch::Sender<Arc<UnitMap>>,
}

impl UnitStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(UnitMap::new()));
        Self { snapshot }
    }

    /// Get the current map (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<UnitMap> {
        self.snapshot.borrow().clone()
    }

    /// Look up one unit by serial number.
    pub fn get(&self, serial_number: &str) -> Option<Arc<UnitSnapshot>> {
        self.snapshot.borrow().get(serial_number).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Subscribe to map replacements. Dropping the stream unsubscribes.
    pub fn subscribe(&self) -> UnitStream {
        UnitStream::new(self.snapshot.subscribe())
    }

    /// Replace the whole map with the given units and notify subscribers.
    ///
    /// Units absent from `units` disappear from the map.
    pub(crate) fn replace(&self, units: Vec<UnitSnapshot>) -> Arc<UnitMap> {
        let map: UnitMap = units
            .into_iter()
            .map(|u| (u.serial_number.clone(), Arc::new(u)))
            .collect();
        let map = Arc::new(map);
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::clone(&map));
        map
    }
}

impl Default for UnitStore {
    fn default() -> Self {
        Self::new()
    }
}

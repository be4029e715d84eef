use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::graph::{LocationId, VehicleClass};

/// A committed change to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    EdgeUpserted {
        origin: LocationId,
        destination: LocationId,
        vehicle: VehicleClass,
        bidirectional: bool,
    },
    EdgeRemoved {
        origin: LocationId,
        destination: LocationId,
        vehicle: VehicleClass,
        removed: usize,
    },
    Reloaded {
        edges: usize,
    },
}

/// Callback invoked with each event and the graph version it produced.
pub type Subscriber = Arc<dyn Fn(&GraphEvent, u64) + Send + Sync>;

/// Change notification for consumers of the graph, such as selection
/// lists which must be refreshed when locations are added.
///
/// Consumers either poll [`ChangeFeed::version`] or register a
/// [`Subscriber`]. Subscribers run on the mutating thread, after the
/// graph lock has been released. They are called from a snapshot of the
/// subscriber list, so a subscriber may itself subscribe or mutate the
/// graph; subscribers added during a publish see only later events.
#[derive(Default)]
pub struct ChangeFeed {
    version: AtomicU64,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl Debug for ChangeFeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        write!(
            f,
            "ChangeFeed {{ version: {}, subscribers: {subscribers} }}",
            self.version()
        )
    }
}

impl ChangeFeed {
    /// Monotonically increasing count of committed changes.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn subscribe(&self, subscriber: impl Fn(&GraphEvent, u64) + Send + Sync + 'static) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
    }

    /// Bumps the version and notifies every subscriber.
    pub(crate) fn publish(&self, event: GraphEvent) -> u64 {
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for subscriber in subscribers {
            subscriber(&event, version);
        }

        version
    }
}

//! The public face of the engine.
//!
//! [`RouteManager`] owns the [`GraphStore`] behind a reader-writer lock,
//! so searches may run concurrently while mutations are exclusive. A
//! mutation holds the write lock until the graph has been persisted,
//! readers never observe an unpersisted change in
//! [`PersistMode::Immediate`].
//!
//! Queries come in two forms. The plain methods keep the sentinel
//! contract: failures are logged and signalled by an empty path or an
//! infinite total. The `try_*` methods return the failure reason.
//!
//! ```rust
//! use waymark::{Edge, KnownVehicle, RouteManager, VehicleClass};
//!
//! let manager = RouteManager::in_memory();
//! let bus = VehicleClass::from(KnownVehicle::Bus);
//!
//! manager.add_route(Edge::new("Alewife", "Davis", bus.clone()).with_distance(2.5), true);
//! manager.add_route(Edge::new("Davis", "Porter", bus.clone()).with_distance(2.0), true);
//!
//! let path = manager.find_shortest_path_with_waypoints("Alewife", &["Davis"], "Porter", &bus);
//! assert_eq!(path, vec!["Alewife", "Davis", "Porter"]);
//! assert_eq!(manager.route_distance(&path, &bus), 4.5);
//! ```

mod editor;

pub use editor::RouteEditor;

use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
#[cfg(feature = "tracing")]
use tracing::Level;

use crate::auth::{AuthError, CredentialStore};
use crate::config::Config;
use crate::graph::{ChangeFeed, Edge, GraphEvent, GraphStore, LocationId, Path, VehicleClass};
use crate::persist::{JsonFile, PersistMode, Persistence, Volatile};
use crate::route::{
    LoopPolicy, Metric, MetricAggregator, MetricSelector, PathFinder, RouteError, RouteTotals,
    WaypointStitcher,
};

/// A stitched path with its totals, both taken from the same graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    pub path: Path,
    /// Sum of the searched leg weights under the requested metric.
    pub weight: f64,
    pub totals: RouteTotals,
}

/// Every location and vehicle class of one graph state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub origins: BTreeSet<LocationId>,
    pub destinations: BTreeSet<LocationId>,
    pub vehicles: BTreeSet<VehicleClass>,
    /// The version of the last change published before the catalog was
    /// read. A change committed concurrently may already be included.
    pub version: u64,
}

pub struct RouteManager {
    store: RwLock<GraphStore>,
    persistence: Box<dyn Persistence>,
    mode: PersistMode,
    policy: LoopPolicy,
    dirty: AtomicBool,
    feed: ChangeFeed,
}

impl Debug for RouteManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteManager")
            .field("store", &*self.read())
            .field("persistence", &self.persistence)
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .field("dirty", &self.is_dirty())
            .field("feed", &self.feed)
            .finish()
    }
}

impl RouteManager {
    /// Opens the graph held by `persistence`, starting empty if nothing
    /// has been persisted yet.
    pub fn open(persistence: impl Persistence + 'static) -> crate::Result<RouteManager> {
        let store = persistence.load()?.unwrap_or_default();

        Ok(RouteManager {
            store: RwLock::new(store),
            persistence: Box::new(persistence),
            mode: PersistMode::default(),
            policy: LoopPolicy::default(),
            dirty: AtomicBool::new(false),
            feed: ChangeFeed::default(),
        })
    }

    /// Opens the JSON graph file named by `config`, with its
    /// persistence mode and loop policy.
    pub fn from_config(config: &Config) -> crate::Result<RouteManager> {
        Ok(RouteManager::open(JsonFile::new(&config.database))?
            .with_mode(config.persist)
            .with_loop_policy(config.loop_policy))
    }

    /// An empty graph which is never persisted.
    pub fn in_memory() -> RouteManager {
        RouteManager {
            store: RwLock::new(GraphStore::new()),
            persistence: Box::new(Volatile),
            mode: PersistMode::default(),
            policy: LoopPolicy::default(),
            dirty: AtomicBool::new(false),
            feed: ChangeFeed::default(),
        }
    }

    pub fn with_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_loop_policy(mut self, policy: LoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    pub fn loop_policy(&self) -> LoopPolicy {
        self.policy
    }

    fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current graph.
    pub fn snapshot(&self) -> GraphStore {
        self.read().clone()
    }

    // Mutation

    /// Adds `edge`, replacing any edge with the same origin, destination
    /// and vehicle class. When `bidirectional`, the reverse edge is added
    /// with identical weights.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    pub fn try_add_route(&self, edge: Edge, bidirectional: bool) -> crate::Result<()> {
        let event = GraphEvent::EdgeUpserted {
            origin: edge.origin().to_string(),
            destination: edge.destination().to_string(),
            vehicle: edge.vehicle().clone(),
            bidirectional,
        };

        let mut store = self.write();
        store.upsert_edge(edge, bidirectional)?;
        let committed = self.commit(&store);
        drop(store);

        if let GraphEvent::EdgeUpserted {
            origin,
            destination,
            vehicle,
            ..
        } = &event
        {
            info!("Route added: {origin} -> {destination} for vehicle type: {vehicle}");
        }

        self.feed.publish(event);
        committed
    }

    /// As [`RouteManager::try_add_route`], logging instead of returning
    /// failures. Malformed edges leave the graph untouched.
    pub fn add_route(&self, edge: Edge, bidirectional: bool) {
        if let Err(err) = self.try_add_route(edge, bidirectional) {
            error!("Error: {err}");
        }
    }

    /// Removes the edge `origin -> destination` for `vehicle`, and its
    /// mirror when `bidirectional`. Returns the number of edges removed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    pub fn try_remove_route(
        &self,
        origin: &str,
        destination: &str,
        vehicle: &VehicleClass,
        bidirectional: bool,
    ) -> crate::Result<usize> {
        let mut store = self.write();
        let removed = store.remove_edge(origin, destination, vehicle, bidirectional)?;

        if removed == 0 {
            warn!("No route {origin} -> {destination} for vehicle type {vehicle} to remove");
            return Ok(0);
        }

        let committed = self.commit(&store);
        drop(store);

        info!("Route removed: {origin} -> {destination} for vehicle type: {vehicle}");
        self.feed.publish(GraphEvent::EdgeRemoved {
            origin: origin.to_string(),
            destination: destination.to_string(),
            vehicle: vehicle.clone(),
            removed,
        });

        committed.map(|_| removed)
    }

    /// As [`RouteManager::try_remove_route`], returning whether any edge
    /// was removed.
    pub fn remove_route(
        &self,
        origin: &str,
        destination: &str,
        vehicle: &VehicleClass,
        bidirectional: bool,
    ) -> bool {
        match self.try_remove_route(origin, destination, vehicle, bidirectional) {
            Ok(removed) => removed > 0,
            Err(err) => {
                error!("Error: {err}");
                false
            }
        }
    }

    /// Replaces the in-memory graph with the persisted one.
    ///
    /// Unflushed changes made in [`PersistMode::Deferred`] are discarded.
    pub fn reload(&self) -> crate::Result<()> {
        info!("Rebuilding the graph...");

        let mut store = self.write();
        *store = self.persistence.load()?.unwrap_or_default();
        self.dirty.store(false, Ordering::Release);

        let edges = store.edge_count();
        drop(store);

        info!("Graph rebuilt with {edges} edges");
        self.feed.publish(GraphEvent::Reloaded { edges });
        Ok(())
    }

    /// Persists the graph now, regardless of mode.
    pub fn flush(&self) -> crate::Result<()> {
        let store = self.write();
        self.persistence.persist(&store)?;
        self.dirty.store(false, Ordering::Release);
        Ok(())
    }

    /// Whether committed mutations have not yet been persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Persists a mutation according to the mode. Must be called while
    /// holding the write lock. On failure the graph stays dirty, so the
    /// change is retried by the next flush.
    fn commit(&self, store: &GraphStore) -> crate::Result<()> {
        self.dirty.store(true, Ordering::Release);

        if self.mode == PersistMode::Deferred {
            return Ok(());
        }

        self.persistence.persist(store)?;
        self.dirty.store(false, Ordering::Release);
        Ok(())
    }

    /// Hands out a [`RouteEditor`] if `credentials` accepts the user.
    pub fn authorize<'a>(
        &'a self,
        credentials: &dyn CredentialStore,
        username: &'a str,
        password: &str,
    ) -> Result<RouteEditor<'a>, AuthError> {
        if !credentials.authenticate(username, password) {
            warn!("Denied graph access to {username}");
            return Err(AuthError::Denied(username.to_string()));
        }

        Ok(RouteEditor::new(self, username))
    }

    // Change notification

    /// Count of committed changes since the manager was opened.
    pub fn version(&self) -> u64 {
        self.feed.version()
    }

    /// Registers `subscriber` to be called after every committed change.
    /// Subscribers may query the manager.
    pub fn on_graph_changed(&self, subscriber: impl Fn(&GraphEvent, u64) + Send + Sync + 'static) {
        self.feed.subscribe(subscriber);
    }

    // Search

    /// Finds a `metric`-optimal path visiting `waypoints` in order.
    pub fn try_find_path_with_waypoints<S, M>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Result<Path, RouteError>
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        WaypointStitcher::new(&store)
            .with_policy(self.policy)
            .try_find_path(start, waypoints, destination, vehicle, metric)
            .map(|solution| solution.path)
    }

    /// Finds a path as [`RouteManager::try_find_path_with_waypoints`]
    /// does and totals it, under a single read lock. A concurrent
    /// mutation can never pair the path with totals of a different graph.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    pub fn try_plan_route<S, M>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Result<Itinerary, RouteError>
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        let solution = WaypointStitcher::new(&store)
            .with_policy(self.policy)
            .try_find_path(start, waypoints, destination, vehicle, metric)?;
        let totals = MetricAggregator::new(&store).totals(&solution.path, vehicle);

        Ok(Itinerary {
            path: solution.path,
            weight: solution.weight,
            totals,
        })
    }

    /// As [`RouteManager::try_find_path_with_waypoints`], returning an
    /// empty path on failure.
    pub fn find_path_with_waypoints<S, M>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Path
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        WaypointStitcher::new(&store)
            .with_policy(self.policy)
            .find_path(start, waypoints, destination, vehicle, metric)
    }

    /// Single-pair search without waypoints.
    pub fn find_path<M>(
        &self,
        start: &str,
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Path
    where
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        PathFinder::new(&store).find_path(start, destination, vehicle, metric)
    }

    pub fn find_shortest_path_with_waypoints<S: AsRef<str>>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
    ) -> Path {
        self.find_path_with_waypoints(start, waypoints, destination, vehicle, &Metric::Distance)
    }

    pub fn find_cost_optimal_path_with_waypoints<S: AsRef<str>>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
    ) -> Path {
        self.find_path_with_waypoints(start, waypoints, destination, vehicle, &Metric::Cost)
    }

    pub fn find_least_traffic_path_with_waypoints<S: AsRef<str>>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
    ) -> Path {
        self.find_path_with_waypoints(start, waypoints, destination, vehicle, &Metric::Traffic)
    }

    // Aggregation

    pub fn try_sum_metric<S, M>(
        &self,
        path: &[S],
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Result<f64, RouteError>
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        MetricAggregator::new(&store).try_sum_metric(path, vehicle, metric)
    }

    /// Sums `metric` along `path`, or positive infinity if some
    /// consecutive pair has no direct edge.
    pub fn sum_metric<S, M>(&self, path: &[S], vehicle: &VehicleClass, metric: &M) -> f64
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        let store = self.read();
        MetricAggregator::new(&store).sum_metric(path, vehicle, metric)
    }

    pub fn route_distance<S: AsRef<str>>(&self, path: &[S], vehicle: &VehicleClass) -> f64 {
        self.sum_metric(path, vehicle, &Metric::Distance)
    }

    pub fn route_cost<S: AsRef<str>>(&self, path: &[S], vehicle: &VehicleClass) -> f64 {
        self.sum_metric(path, vehicle, &Metric::Cost)
    }

    pub fn route_traffic<S: AsRef<str>>(&self, path: &[S], vehicle: &VehicleClass) -> f64 {
        self.sum_metric(path, vehicle, &Metric::Traffic)
    }

    /// All three totals of `path`, computed under one read lock.
    pub fn route_totals<S: AsRef<str>>(&self, path: &[S], vehicle: &VehicleClass) -> RouteTotals {
        let store = self.read();
        MetricAggregator::new(&store).totals(path, vehicle)
    }

    // Enumeration

    /// Origins, destinations and vehicle classes read under one lock.
    pub fn catalog(&self) -> Catalog {
        let store = self.read();

        Catalog {
            origins: store.known_origins(),
            destinations: store.known_destinations(),
            vehicles: store.vehicles(),
            version: self.version(),
        }
    }

    pub fn known_origins(&self) -> BTreeSet<LocationId> {
        self.read().known_origins()
    }

    pub fn known_destinations(&self) -> BTreeSet<LocationId> {
        self.read().known_destinations()
    }

    pub fn stations(&self) -> Vec<LocationId> {
        self.read().stations()
    }

    pub fn vehicles(&self) -> BTreeSet<VehicleClass> {
        self.read().vehicles()
    }

    pub fn routes_from(&self, location: &str, vehicle: &VehicleClass) -> Vec<Edge> {
        self.read().edges_from(location, vehicle).to_vec()
    }
}

impl Drop for RouteManager {
    fn drop(&mut self) {
        if !self.is_dirty() {
            return;
        }

        info!("Flushing unsaved graph changes");
        if let Err(err) = self.flush() {
            error!("Unsaved graph changes were lost: {err}");
        }
    }
}

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

use crate::graph::{Edge, GraphError, LocationId, VehicleClass};

/// Outgoing edges, keyed first by origin and then by vehicle class.
///
/// Insertion order is preserved at every level so that the persisted
/// form of an unmodified store is stable.
pub type Adjacency = IndexMap<LocationId, IndexMap<VehicleClass, Vec<Edge>>>;

/// Vehicle-scoped adjacency store for the routing graph.
///
/// Within the list for one `(origin, vehicle)` pair, at most one edge
/// targets any given destination. Upserting a duplicate replaces the
/// previous edge.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphStore {
    adjacency: Adjacency,
}

impl Debug for GraphStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GraphStore with Stations: {}, Edges: {}",
            self.adjacency.len(),
            self.edge_count()
        )
    }
}

impl From<Adjacency> for GraphStore {
    fn from(adjacency: Adjacency) -> Self {
        GraphStore { adjacency }
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Every edge in the store, in adjacency order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.adjacency
            .values()
            .flat_map(|vehicles| vehicles.values())
            .flatten()
    }

    /// Inserts `edge`, replacing any prior edge with the same origin,
    /// destination and vehicle class. When `bidirectional`, the mirrored
    /// edge is upserted as well.
    ///
    /// Malformed edges are rejected without touching the store.
    pub fn upsert_edge(&mut self, edge: Edge, bidirectional: bool) -> Result<(), GraphError> {
        edge.validate()?;

        let mirror = bidirectional.then(|| edge.reversed());
        self.upsert_directed(edge);

        if let Some(mirror) = mirror {
            self.upsert_directed(mirror);
        }

        Ok(())
    }

    fn upsert_directed(&mut self, edge: Edge) {
        let edges = self
            .adjacency
            .entry(edge.origin().to_string())
            .or_default()
            .entry(edge.vehicle().clone())
            .or_default();

        let before = edges.len();
        edges.retain(|existing| existing.destination() != edge.destination());

        if edges.len() != before {
            debug!("Replacing edge {edge}");
        }

        edges.push(edge);
    }

    /// Removes the edge `origin -> destination` under `vehicle` (and its
    /// mirror when `bidirectional`). Returns the number of edges removed.
    ///
    /// Adjacency lists and stations left empty are pruned.
    pub fn remove_edge(
        &mut self,
        origin: &str,
        destination: &str,
        vehicle: &VehicleClass,
        bidirectional: bool,
    ) -> Result<usize, GraphError> {
        if origin.trim().is_empty() {
            return Err(GraphError::MissingField("origin"));
        }
        if destination.trim().is_empty() {
            return Err(GraphError::MissingField("destination"));
        }
        if vehicle.is_unset() {
            return Err(GraphError::MissingField("vehicle type"));
        }

        let mut removed = self.remove_directed(origin, destination, vehicle);
        if bidirectional {
            removed += self.remove_directed(destination, origin, vehicle);
        }

        Ok(removed)
    }

    fn remove_directed(&mut self, origin: &str, destination: &str, vehicle: &VehicleClass) -> usize {
        let Some(vehicles) = self.adjacency.get_mut(origin) else {
            return 0;
        };
        let Some(edges) = vehicles.get_mut(vehicle) else {
            return 0;
        };

        let before = edges.len();
        edges.retain(|edge| edge.destination() != destination);
        let removed = before - edges.len();

        if edges.is_empty() {
            vehicles.shift_remove(vehicle);
        }
        if vehicles.is_empty() {
            info!("Station {origin} has no remaining outgoing edges, pruning");
            self.adjacency.shift_remove(origin);
        }

        removed
    }

    /// Outgoing edges of `location` for `vehicle`, empty if there are none.
    #[inline]
    pub fn edges_from(&self, location: &str, vehicle: &VehicleClass) -> &[Edge] {
        self.adjacency
            .get(location)
            .and_then(|vehicles| vehicles.get(vehicle))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first direct edge `from -> to` under `vehicle`.
    #[inline]
    pub fn edge_between(&self, from: &str, to: &str, vehicle: &VehicleClass) -> Option<&Edge> {
        self.edges_from(from, vehicle)
            .iter()
            .find(|edge| edge.destination() == to)
    }

    /// Whether `location` has at least one outgoing edge for `vehicle`.
    #[inline]
    pub fn has_outgoing(&self, location: &str, vehicle: &VehicleClass) -> bool {
        !self.edges_from(location, vehicle).is_empty()
    }

    /// Whether `location` appears anywhere in the graph, as either
    /// an origin or a destination, under any vehicle class.
    pub fn contains_location(&self, location: &str) -> bool {
        self.adjacency.contains_key(location)
            || self.edges().any(|edge| edge.destination() == location)
    }

    /// Locations with outgoing edges, in insertion order.
    pub fn stations(&self) -> Vec<LocationId> {
        self.adjacency.keys().cloned().collect()
    }

    /// Every location appearing as an edge origin, across all vehicle classes.
    pub fn known_origins(&self) -> BTreeSet<LocationId> {
        self.edges().map(|edge| edge.origin().to_string()).collect()
    }

    /// Every location appearing as an edge destination, across all vehicle classes.
    pub fn known_destinations(&self) -> BTreeSet<LocationId> {
        self.edges()
            .map(|edge| edge.destination().to_string())
            .collect()
    }

    /// Every vehicle class with at least one registered edge.
    pub fn vehicles(&self) -> BTreeSet<VehicleClass> {
        self.edges().map(|edge| edge.vehicle().clone()).collect()
    }
}

use itertools::Itertools;
use log::{debug, warn};
use measure_time::debug_time;
#[cfg(feature = "tracing")]
use tracing::Level;

use crate::graph::{GraphStore, LocationId, Path, VehicleClass};
use crate::route::primitives::Dijkstra;
use crate::route::{MetricSelector, RouteError};

/// A path together with the weight it was optimised for.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub path: Path,
    /// Total weight of the searched edges. Under
    /// [`LoopPolicy::Collapse`](crate::route::LoopPolicy::Collapse) this
    /// is the weight of the legs as searched, before repeated locations
    /// were dropped from `path`, since the collapsed path need not be
    /// drivable edge by edge.
    pub weight: f64,
}

/// Single-pair shortest path search over a [`GraphStore`],
/// generic over the metric being minimised.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    store: &'a GraphStore,
}

impl<'a> PathFinder<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        PathFinder { store }
    }

    /// Finds the `metric`-optimal path from `start` to `destination`,
    /// only traversing edges registered under `vehicle`.
    ///
    /// The search ends as soon as the destination is settled.
    /// Equal-cost candidates are expanded in the order they were
    /// discovered.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::DEBUG))]
    pub fn try_find_path<M>(
        &self,
        start: &str,
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Result<Solution, RouteError>
    where
        M: MetricSelector + ?Sized,
    {
        if !self.store.has_outgoing(start, vehicle) {
            return Err(RouteError::UnknownStart {
                start: start.to_string(),
                vehicle: vehicle.clone(),
            });
        }

        if !self.store.contains_location(destination) {
            return Err(RouteError::UnknownDestination(destination.to_string()));
        }

        debug_time!("Routing {start} -> {destination}");

        let store = self.store;
        let mut reachable = Dijkstra.reach(&start.to_string(), |node: &LocationId| {
            store
                .edges_from(node, vehicle)
                .iter()
                .filter_map(|edge| {
                    let weight = metric.weight(edge);
                    metric
                        .admits(weight)
                        .then(|| (edge.destination().to_string(), weight))
                })
                .collect::<Vec<_>>()
        });

        let settled = reachable
            .by_ref()
            .find(|item| item.node == destination)
            .ok_or_else(|| RouteError::Unreachable {
                start: start.to_string(),
                destination: destination.to_string(),
                vehicle: vehicle.clone(),
            })?;

        let path = reachable
            .path_to(&settled.node)
            .filter(|path| path.first().is_some_and(|first| first == start))
            .ok_or_else(|| RouteError::InvalidReconstruction {
                start: start.to_string(),
                destination: destination.to_string(),
            })?;

        debug!(
            "Route found from {start} to {destination} for vehicle type {vehicle}: [{}] (weight: {})",
            path.iter().join(", "),
            settled.total_cost
        );

        Ok(Solution {
            path,
            weight: settled.total_cost,
        })
    }

    /// As [`PathFinder::try_find_path`], but signals failure with an
    /// empty path.
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
        self.try_find_path(start, destination, vehicle, metric)
            .map(|solution| solution.path)
            .unwrap_or_else(|err| {
                warn!("Error: {err}");
                Path::new()
            })
    }
}

use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::iter;
use strum::{AsRefStr, Display, EnumString};
#[cfg(feature = "tracing")]
use tracing::Level;

use crate::graph::{GraphStore, Path, VehicleClass};
use crate::route::{MetricSelector, PathFinder, RouteError, Solution};

/// How a stitched path treats locations visited more than once.
///
/// Two consecutive legs may backtrack through a shared location, for
/// example `A -> B -> W` then `W -> B -> C`, yielding a loop at `B`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Keep the concatenated legs as searched. Every consecutive pair
    /// remains a real edge, so aggregated totals match the search.
    #[default]
    Preserve,

    /// Drop every repeat of an earlier location, keeping first
    /// occurrences. The result may skip edges that were searched and
    /// may not be realisable edge-by-edge.
    Collapse,
}

impl LoopPolicy {
    fn apply(&self, path: Path) -> Path {
        match self {
            LoopPolicy::Preserve => path,
            LoopPolicy::Collapse => path.into_iter().unique().collect(),
        }
    }
}

/// Composes a path through an ordered list of mandatory stops by
/// chaining single-pair searches, one per leg.
#[derive(Debug, Clone, Copy)]
pub struct WaypointStitcher<'a> {
    finder: PathFinder<'a>,
    policy: LoopPolicy,
}

impl<'a> WaypointStitcher<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        WaypointStitcher {
            finder: PathFinder::new(store),
            policy: LoopPolicy::default(),
        }
    }

    pub fn with_policy(self, policy: LoopPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Finds a path visiting every waypoint in order. Each leg is
    /// optimal on its own; any failing leg fails the whole query.
    ///
    /// The returned weight is the sum of the leg weights, whatever the
    /// loop policy removes from the path afterwards.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    pub fn try_find_path<S, M>(
        &self,
        start: &str,
        waypoints: &[S],
        destination: &str,
        vehicle: &VehicleClass,
        metric: &M,
    ) -> Result<Solution, RouteError>
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        if waypoints.is_empty() {
            return self
                .finder
                .try_find_path(start, destination, vehicle, metric);
        }

        let stops = iter::once(start)
            .chain(waypoints.iter().map(|waypoint| waypoint.as_ref()))
            .chain(iter::once(destination));

        let mut path = Path::new();
        let mut weight = 0.0;

        for (from, to) in stops.tuple_windows() {
            let leg = self
                .finder
                .try_find_path(from, to, vehicle, metric)
                .map_err(|source| RouteError::Leg {
                    from: from.to_string(),
                    to: to.to_string(),
                    source: Box::new(source),
                })?;

            // The leg starts where the previous one ended.
            path.pop();
            path.extend(leg.path);
            weight += leg.weight;
        }

        let path = self.policy.apply(path);

        info!(
            "Route from {start} to {destination} via {} waypoint(s) for vehicle type {vehicle}: [{}] (weight: {weight})",
            waypoints.len(),
            path.iter().join(", ")
        );

        Ok(Solution { path, weight })
    }

    /// As [`WaypointStitcher::try_find_path`], but signals failure with
    /// an empty path.
    pub fn find_path<S, M>(
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
        self.try_find_path(start, waypoints, destination, vehicle, metric)
            .map(|solution| solution.path)
            .unwrap_or_else(|err| {
                warn!("{err}");
                Path::new()
            })
    }
}

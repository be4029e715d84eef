use itertools::Itertools;
use log::warn;
use serde::Serialize;

use crate::graph::{GraphStore, VehicleClass};
use crate::route::{Metric, MetricSelector, RouteError};

/// The three metric totals of a single path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteTotals {
    pub distance: f64,
    pub cost: f64,
    pub traffic: f64,
}

impl RouteTotals {
    /// Totals of a path which cannot be driven under its vehicle class.
    pub const UNREALIZABLE: RouteTotals = RouteTotals {
        distance: f64::INFINITY,
        cost: f64::INFINITY,
        traffic: f64::INFINITY,
    };

    /// Whether every consecutive pair of the path was a direct edge.
    pub fn is_realizable(&self) -> bool {
        self.distance.is_finite() && self.cost.is_finite() && self.traffic.is_finite()
    }
}

/// Sums metrics over an already-computed path by looking up the direct
/// edge for each consecutive pair. Independent of which metric the path
/// was searched for.
#[derive(Debug, Clone, Copy)]
pub struct MetricAggregator<'a> {
    store: &'a GraphStore,
}

impl<'a> MetricAggregator<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        MetricAggregator { store }
    }

    /// Sums `metric` along `path`. Paths with fewer than two locations
    /// sum to zero. Fails at the first pair with no direct edge.
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
        path.iter()
            .map(|location| location.as_ref())
            .tuple_windows()
            .try_fold(0.0, |total, (from, to)| {
                self.store
                    .edge_between(from, to, vehicle)
                    .map(|edge| total + metric.weight(edge))
                    .ok_or_else(|| RouteError::MissingEdge {
                        from: from.to_string(),
                        to: to.to_string(),
                        vehicle: vehicle.clone(),
                    })
            })
    }

    /// As [`MetricAggregator::try_sum_metric`], returning positive
    /// infinity when the path is not realisable.
    pub fn sum_metric<S, M>(&self, path: &[S], vehicle: &VehicleClass, metric: &M) -> f64
    where
        S: AsRef<str>,
        M: MetricSelector + ?Sized,
    {
        self.try_sum_metric(path, vehicle, metric)
            .unwrap_or_else(|err| {
                warn!("Error: {err}");
                f64::INFINITY
            })
    }

    /// Distance, cost and traffic totals of `path`.
    pub fn totals<S>(&self, path: &[S], vehicle: &VehicleClass) -> RouteTotals
    where
        S: AsRef<str>,
    {
        // Realisability does not depend on the metric, one check suffices.
        match self.try_sum_metric(path, vehicle, &Metric::Distance) {
            Ok(distance) => RouteTotals {
                distance,
                cost: self.sum_metric(path, vehicle, &Metric::Cost),
                traffic: self.sum_metric(path, vehicle, &Metric::Traffic),
            },
            Err(err) => {
                warn!("Error: {err}");
                RouteTotals::UNREALIZABLE
            }
        }
    }
}

use thiserror::Error;

use crate::graph::{LocationId, VehicleClass};

/// Reasons a query could not be satisfied. At the public boundary each
/// of these collapses into an empty path or an infinite total.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("start node {start} or vehicle type {vehicle} does not exist in the graph")]
    UnknownStart {
        start: LocationId,
        vehicle: VehicleClass,
    },

    #[error("destination node {0} does not exist in the graph")]
    UnknownDestination(LocationId),

    #[error("destination {destination} is unreachable from {start} for vehicle type {vehicle}")]
    Unreachable {
        start: LocationId,
        destination: LocationId,
        vehicle: VehicleClass,
    },

    #[error("reconstructed path from {start} to {destination} is invalid")]
    InvalidReconstruction {
        start: LocationId,
        destination: LocationId,
    },

    #[error("no path found from {from} to {to}: {source}")]
    Leg {
        from: LocationId,
        to: LocationId,
        #[source]
        source: Box<RouteError>,
    },

    #[error("no direct route between {from} and {to} for vehicle type {vehicle}")]
    MissingEdge {
        from: LocationId,
        to: LocationId,
        vehicle: VehicleClass,
    },
}

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::graph::GraphError;

/// Name of a location (station, junction, stop) within the graph.
pub type LocationId = String;

/// An ordered sequence of locations, from the query start to its
/// destination. An empty path signals that no route could be found.
pub type Path = Vec<LocationId>;

/// Partition key for edges. Searches for one vehicle class never
/// traverse edges registered under another.
///
/// The set of classes is open, any non-empty name is accepted.
/// The standard classes are listed in [`KnownVehicle`].
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VehicleClass(String);

impl VehicleClass {
    pub fn new(name: impl Into<String>) -> Self {
        VehicleClass(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the class carries no usable name.
    #[inline]
    pub fn is_unset(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for VehicleClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for VehicleClass {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VehicleClass {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleClass {
    fn from(value: &str) -> Self {
        VehicleClass(value.to_string())
    }
}

impl From<String> for VehicleClass {
    fn from(value: String) -> Self {
        VehicleClass(value)
    }
}

impl From<KnownVehicle> for VehicleClass {
    fn from(value: KnownVehicle) -> Self {
        VehicleClass(value.to_string())
    }
}

/// The vehicle classes offered for selection by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum KnownVehicle {
    #[strum(to_string = "Car", serialize = "car")]
    Car,
    #[strum(to_string = "Bus", serialize = "bus")]
    Bus,
    #[strum(
        to_string = "Heavy Vehicles",
        serialize = "heavy-vehicle",
        serialize = "heavy_vehicle"
    )]
    HeavyVehicle,
}

/// A directed connection between two locations for a single vehicle class,
/// carrying three independent weights.
///
/// Edges are immutable once built. The serialized field names match the
/// persisted graph file.
///
/// ```rust
/// use waymark::{Edge, KnownVehicle};
///
/// let edge = Edge::new("Porter", "Davis", KnownVehicle::Bus)
///     .with_distance(2.0)
///     .with_cost(4.0)
///     .with_traffic(7.0);
///
/// assert_eq!(edge.reversed().origin(), "Davis");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "source")]
    origin: LocationId,
    destination: LocationId,
    distance: f64,
    #[serde(rename = "vehicleType")]
    vehicle: VehicleClass,
    cost: f64,
    #[serde(rename = "leastTrafficTime")]
    traffic: f64,
}

impl Edge {
    /// Creates a zero-weighted edge. Weights are supplied with the
    /// `with_*` builders.
    pub fn new(
        origin: impl Into<LocationId>,
        destination: impl Into<LocationId>,
        vehicle: impl Into<VehicleClass>,
    ) -> Self {
        Edge {
            origin: origin.into(),
            destination: destination.into(),
            distance: 0.0,
            vehicle: vehicle.into(),
            cost: 0.0,
            traffic: 0.0,
        }
    }

    pub fn with_distance(self, distance: f64) -> Self {
        Self { distance, ..self }
    }

    pub fn with_cost(self, cost: f64) -> Self {
        Self { cost, ..self }
    }

    pub fn with_traffic(self, traffic: f64) -> Self {
        Self { traffic, ..self }
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[inline]
    pub fn vehicle(&self) -> &VehicleClass {
        &self.vehicle
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    #[inline]
    pub fn traffic(&self) -> f64 {
        self.traffic
    }

    /// The mirror edge, `destination -> origin`, with identical weights.
    pub fn reversed(&self) -> Edge {
        Edge {
            origin: self.destination.clone(),
            destination: self.origin.clone(),
            ..self.clone()
        }
    }

    /// Rejects edges lacking an origin, destination or vehicle class.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.origin.trim().is_empty()
            || self.destination.trim().is_empty()
            || self.vehicle.is_unset()
        {
            return Err(GraphError::MalformedEdge(Box::new(self.clone())));
        }

        Ok(())
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} -> {:?} [{:?}] (distance: {}, cost: {}, traffic: {})",
            self.origin, self.destination, self.vehicle.0, self.distance, self.cost, self.traffic
        )
    }
}

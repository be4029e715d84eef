#![doc = include_str!("../README.md")]

#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod manager;
#[doc(hidden)]
pub mod persist;
#[doc(hidden)]
pub mod route;
#[cfg(feature = "http_server")]
pub mod server;
pub mod util;

#[doc(inline)]
pub use auth::{CredentialStore, InMemoryCredentials};
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use graph::{Edge, GraphStore, KnownVehicle, LocationId, Path, VehicleClass};
#[doc(inline)]
pub use manager::{Catalog, Itinerary, RouteEditor, RouteManager};
#[doc(inline)]
pub use persist::{JsonFile, PersistMode, Persistence, Volatile};
#[doc(inline)]
pub use route::{LoopPolicy, Metric, MetricSelector, RouteTotals};

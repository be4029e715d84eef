//! Path search and metric aggregation.
//!
//! A single Dijkstra implementation ([`primitives::Dijkstra`]) serves
//! every metric through the [`MetricSelector`] trait. On top of it:
//!
//! - [`PathFinder`]: single-pair search.
//! - [`WaypointStitcher`]: ordered mandatory stops, one search per leg.
//! - [`MetricAggregator`]: re-walks a path and sums any metric over it.
//!
//! Each operation has a `try_*` form returning a [`RouteError`], and a
//! sentinel form returning an empty path or positive infinity.

#[doc(hidden)]
pub mod aggregate;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod metric;
#[doc(hidden)]
pub mod path;
pub mod primitives;
#[doc(hidden)]
#[cfg(test)]
mod test;
#[doc(hidden)]
pub mod waypoint;

#[doc(inline)]
pub use aggregate::{MetricAggregator, RouteTotals};
#[doc(inline)]
pub use error::RouteError;
#[doc(inline)]
pub use metric::{Metric, MetricSelector};
#[doc(inline)]
pub use path::{PathFinder, Solution};
#[doc(inline)]
pub use waypoint::{LoopPolicy, WaypointStitcher};

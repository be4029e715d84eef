//! Metric selection for the search and aggregation routines.
//!
//! Any search in this crate is parametrised over a [`MetricSelector`],
//! which maps an [`Edge`] onto the scalar being optimised. The three
//! built-in metrics are provided by [`Metric`], though callers may
//! supply their own selector, for example a blend of weights.
//!
//! ```rust
//! use waymark::{Edge, MetricSelector};
//!
//! struct Blended;
//!
//! impl MetricSelector for Blended {
//!     fn weight(&self, edge: &Edge) -> f64 {
//!         edge.distance() + 0.5 * edge.traffic()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::graph::Edge;

pub trait MetricSelector {
    /// The weight of traversing `edge` under this metric.
    fn weight(&self, edge: &Edge) -> f64;

    /// Whether an edge of the given weight may be relaxed during a search.
    fn admits(&self, weight: f64) -> bool {
        !weight.is_nan()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Physical length of the edge.
    #[default]
    Distance,
    /// Monetary cost, such as tolls or fares.
    Cost,
    /// Time lost to traffic.
    Traffic,
}

impl MetricSelector for Metric {
    #[inline]
    fn weight(&self, edge: &Edge) -> f64 {
        match self {
            Metric::Distance => edge.distance(),
            Metric::Cost => edge.cost(),
            Metric::Traffic => edge.traffic(),
        }
    }

    /// Non-positive distances are invalid and never relaxed. Cost and
    /// traffic may legitimately be zero.
    #[inline]
    fn admits(&self, weight: f64) -> bool {
        match self {
            Metric::Distance => weight > 0.0,
            Metric::Cost | Metric::Traffic => !weight.is_nan(),
        }
    }
}

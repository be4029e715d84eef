//! The vehicle-scoped location graph.
//!
//! A [`GraphStore`] maps each origin location to its outgoing [`Edge`]s,
//! partitioned by [`VehicleClass`]. Each edge carries three independent
//! weights (distance, cost and traffic time), any of which can be
//! optimised for by the [`route`](crate::route) module.

#[doc(hidden)]
pub mod edge;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod event;
#[doc(hidden)]
pub mod store;

#[doc(inline)]
pub use edge::*;
#[doc(inline)]
pub use error::GraphError;
#[doc(inline)]
pub use event::{ChangeFeed, GraphEvent, Subscriber};
#[doc(inline)]
pub use store::{Adjacency, GraphStore};

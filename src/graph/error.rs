use thiserror::Error;

use crate::graph::Edge;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("route source, destination, or vehicle type is missing: {0}")]
    MalformedEdge(Box<Edge>),

    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

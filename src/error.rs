use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::impl_err;
use crate::persist::PersistError;
use crate::route::RouteError;

/// Aggregate error for every fallible operation in the crate.
///
/// The sentinel-returning methods on [`RouteManager`](crate::RouteManager)
/// never surface this type; it is produced by their `try_*` counterparts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("graph: {0}")]
    Graph(GraphError),

    #[error("routing: {0}")]
    Route(RouteError),

    #[error("persistence: {0}")]
    Persist(PersistError),

    #[error("configuration: {0}")]
    Config(ConfigError),

    #[error("access: {0}")]
    Auth(AuthError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl_err!(GraphError, Graph);
impl_err!(RouteError, Route);
impl_err!(PersistError, Persist);
impl_err!(ConfigError, Config);
impl_err!(AuthError, Auth);

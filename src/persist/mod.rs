//! Persistence of the [`GraphStore`] to stable storage.
//!
//! The whole store is serialized on every save, there are no incremental
//! writes. This suits graphs of a few hundred stations; larger graphs
//! should batch mutations using [`PersistMode::Deferred`].

#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod json;

#[doc(inline)]
pub use error::PersistError;
#[doc(inline)]
pub use json::JsonFile;

use std::fmt::Debug;
use strum::{AsRefStr, Display, EnumString};

use crate::graph::GraphStore;

/// A backing store for the graph.
pub trait Persistence: Debug + Send + Sync {
    /// Loads the persisted graph. Returns `None` when nothing has been
    /// persisted yet, which is not an error.
    fn load(&self) -> Result<Option<GraphStore>, PersistError>;

    /// Replaces the persisted graph with `store`.
    fn persist(&self, store: &GraphStore) -> Result<(), PersistError>;
}

/// Keeps the graph in memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Volatile;

impl Persistence for Volatile {
    fn load(&self) -> Result<Option<GraphStore>, PersistError> {
        Ok(None)
    }

    fn persist(&self, _: &GraphStore) -> Result<(), PersistError> {
        Ok(())
    }
}

/// When committed mutations reach the backing store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PersistMode {
    /// Persist synchronously as part of every mutation.
    #[default]
    Immediate,

    /// Mark the graph dirty and persist on an explicit flush, or when
    /// the owning manager is dropped.
    Deferred,
}

use log::info;

use crate::graph::{Edge, VehicleClass};
use crate::manager::RouteManager;

/// Mutating access to a [`RouteManager`], handed out by
/// [`RouteManager::authorize`] to an authenticated user.
///
/// Queries need no authorization and stay on the manager itself.
#[derive(Debug, Clone, Copy)]
pub struct RouteEditor<'a> {
    manager: &'a RouteManager,
    username: &'a str,
}

impl<'a> RouteEditor<'a> {
    pub(crate) fn new(manager: &'a RouteManager, username: &'a str) -> Self {
        RouteEditor { manager, username }
    }

    pub fn username(&self) -> &str {
        self.username
    }

    pub fn manager(&self) -> &'a RouteManager {
        self.manager
    }

    pub fn add_route(&self, edge: Edge, bidirectional: bool) -> crate::Result<()> {
        info!("{} is adding route {edge}", self.username);
        self.manager.try_add_route(edge, bidirectional)
    }

    pub fn remove_route(
        &self,
        origin: &str,
        destination: &str,
        vehicle: &VehicleClass,
        bidirectional: bool,
    ) -> crate::Result<usize> {
        info!(
            "{} is removing route {origin} -> {destination} ({vehicle})",
            self.username
        );
        self.manager
            .try_remove_route(origin, destination, vehicle, bidirectional)
    }

    pub fn reload(&self) -> crate::Result<()> {
        info!("{} requested a graph reload", self.username);
        self.manager.reload()
    }

    pub fn flush(&self) -> crate::Result<()> {
        info!("{} requested a flush", self.username);
        self.manager.flush()
    }
}

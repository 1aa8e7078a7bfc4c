//! Immutable contexts the engine operates on.
//!
//! A [`Network`] bundles everything that stays fixed while the user explores
//! origins: the query window, its stop tree cache, opportunity grids and
//! transit metadata. A [`Session`] adds one [`Origin`]. Both are rebuilt rather
//! than mutated, and operations that need an origin take a `&Session`, so a
//! half-loaded state cannot reach the propagation code.

use std::sync::Arc;

use log::info;

use super::grid::{Grid, GridSet};
use super::origin::Origin;
use super::query::Query;
use super::stop_tree_cache::StopTreeCache;
use super::transitive::TransitiveNetwork;
use crate::Error;

#[derive(Debug, Clone)]
pub struct Network {
    query: Arc<Query>,
    stop_trees: Arc<StopTreeCache>,
    grids: GridSet,
    transitive: Option<Arc<TransitiveNetwork>>,
}

impl Network {
    /// Pairs a query with its stop tree cache. Transit metadata embedded in the
    /// query moves into the network.
    pub fn new(mut query: Query, stop_trees: Arc<StopTreeCache>) -> Result<Self, Error> {
        if query.width() == 0 || query.height() == 0 {
            return Err(Error::Configuration(format!(
                "query of {}x{} pixels is empty",
                query.width(),
                query.height()
            )));
        }
        if stop_trees.pixel_count() != query.pixel_count() {
            return Err(Error::Configuration(format!(
                "stop tree cache covers {} pixels but the query has {}",
                stop_trees.pixel_count(),
                query.pixel_count()
            )));
        }

        let transitive = query.transitive_data.take().map(Arc::new);
        Ok(Self {
            query: Arc::new(query),
            stop_trees,
            grids: GridSet::default(),
            transitive,
        })
    }

    /// Returns a network with `grid` registered under `name`.
    ///
    /// Grids must be at the query's zoom level and share one extent.
    pub fn with_grid(&self, name: impl Into<String>, grid: Arc<Grid>) -> Result<Self, Error> {
        let name = name.into();
        check_grid_zoom(&self.query, &name, &grid)?;
        Ok(Self {
            grids: self.grids.with_grid(name, grid)?,
            ..self.clone()
        })
    }

    pub fn with_transitive_network(&self, network: Arc<TransitiveNetwork>) -> Self {
        Self {
            transitive: Some(network),
            ..self.clone()
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn stop_trees(&self) -> &StopTreeCache {
        &self.stop_trees
    }

    pub fn grids(&self) -> &GridSet {
        &self.grids
    }

    pub fn transitive_network(&self) -> Option<&TransitiveNetwork> {
        self.transitive.as_deref()
    }
}

fn check_grid_zoom(query: &Query, name: &str, grid: &Grid) -> Result<(), Error> {
    if grid.extent().zoom == query.extent.zoom {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "grid '{name}' is at zoom {} but the query is at zoom {}",
            grid.extent().zoom,
            query.extent.zoom
        )))
    }
}

/// A network together with the origin currently selected
#[derive(Debug, Clone)]
pub struct Session {
    network: Arc<Network>,
    origin: Arc<Origin>,
}

impl Session {
    pub fn new(network: Arc<Network>, origin: Arc<Origin>) -> Result<Self, Error> {
        if let Some(max_stop) = network.stop_trees().max_stop() {
            if max_stop >= origin.n_stops() {
                return Err(Error::CorruptData(format!(
                    "stop tree cache references stop {max_stop} but the origin covers {} stops",
                    origin.n_stops()
                )));
            }
        }
        let point = origin.point();
        if !network
            .query()
            .extent
            .contains(i64::from(point.x), i64::from(point.y))
        {
            return Err(Error::OutOfBounds {
                x: i64::from(point.x),
                y: i64::from(point.y),
            });
        }
        Ok(Self { network, origin })
    }

    /// Same network, different origin
    pub fn with_origin(&self, origin: Arc<Origin>) -> Result<Self, Error> {
        Self::new(self.network.clone(), origin)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn shared_network(&self) -> &Arc<Network> {
        &self.network
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn query(&self) -> &Query {
        self.network.query()
    }
}

/// Collects payloads in whatever order they arrive and hands out a
/// [`Network`] or [`Session`] once everything they need is present.
///
/// Every `with_*` call returns a new builder; nothing is modified in place.
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    query: Option<Query>,
    stop_trees: Option<Arc<StopTreeCache>>,
    grids: Vec<(String, Arc<Grid>)>,
    transitive: Option<Arc<TransitiveNetwork>>,
    origin: Option<Arc<Origin>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query; a stop tree cache or origin loaded for another query
    /// window is dropped
    pub fn with_query(&self, mut query: Query) -> Self {
        let same_window = self
            .query
            .as_ref()
            .is_some_and(|q| q.extent == query.extent);
        let transitive = query
            .transitive_data
            .take()
            .map(Arc::new)
            .or_else(|| self.transitive.clone());

        Self {
            stop_trees: self.stop_trees.clone().filter(|_| same_window),
            origin: self.origin.clone().filter(|_| same_window),
            query: Some(query),
            transitive,
            grids: self.grids.clone(),
        }
    }

    /// Decodes a stop tree cache for the current query
    pub fn with_stop_trees(&self, bytes: &[u8]) -> Result<Self, Error> {
        let query = self.query.as_ref().ok_or_else(|| {
            Error::Configuration("the query must be set before the stop tree cache".to_string())
        })?;
        let stop_trees = StopTreeCache::from_bytes(bytes, query.pixel_count())?;
        info!(
            "Loaded stop tree cache for {} pixels",
            stop_trees.pixel_count()
        );
        Ok(Self {
            stop_trees: Some(Arc::new(stop_trees)),
            ..self.clone()
        })
    }

    /// Registers a grid, rejecting it straight away if it does not match the
    /// grids already registered
    pub fn with_grid(&self, name: impl Into<String>, grid: Arc<Grid>) -> Result<Self, Error> {
        let name = name.into();
        let mut set = GridSet::default();
        for (n, g) in &self.grids {
            set = set.with_grid(n.clone(), g.clone())?;
        }
        set.with_grid(name.clone(), grid.clone())?;
        if let Some(query) = &self.query {
            check_grid_zoom(query, &name, &grid)?;
        }

        let mut grids = self.grids.clone();
        match grids.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = grid,
            None => grids.push((name, grid)),
        }
        Ok(Self {
            grids,
            ..self.clone()
        })
    }

    pub fn with_transitive_network(&self, network: TransitiveNetwork) -> Self {
        Self {
            transitive: Some(Arc::new(network)),
            ..self.clone()
        }
    }

    pub fn with_origin(&self, origin: Origin) -> Self {
        Self {
            origin: Some(Arc::new(origin)),
            ..self.clone()
        }
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn origin(&self) -> Option<&Arc<Origin>> {
        self.origin.as_ref()
    }

    pub fn grid(&self, name: &str) -> Option<&Arc<Grid>> {
        self.grids
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, grid)| grid)
    }

    /// Query and stop tree cache are loaded
    pub fn is_ready(&self) -> bool {
        self.query.is_some() && self.stop_trees.is_some()
    }

    /// Ready, and an origin is selected
    pub fn is_loaded(&self) -> bool {
        self.is_ready() && self.origin.is_some()
    }

    pub fn network(&self) -> Result<Network, Error> {
        let (Some(query), Some(stop_trees)) = (&self.query, &self.stop_trees) else {
            return Err(Error::Configuration(
                "query and stop tree cache must be loaded first".to_string(),
            ));
        };

        let mut network = Network::new(query.clone(), stop_trees.clone())?;
        for (name, grid) in &self.grids {
            network = network.with_grid(name.clone(), grid.clone())?;
        }
        if let Some(transitive) = &self.transitive {
            network = network.with_transitive_network(transitive.clone());
        }
        Ok(network)
    }

    pub fn build(&self) -> Result<Session, Error> {
        let origin = self
            .origin
            .clone()
            .ok_or_else(|| Error::Configuration("no origin has been selected".to_string()))?;
        Session::new(Arc::new(self.network()?), origin)
    }
}

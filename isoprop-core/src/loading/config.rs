use std::path::PathBuf;

use serde::Deserialize;

/// Files making up one precomputed network
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Query descriptor (JSON)
    pub query_path: PathBuf,
    /// Stop tree cache (binary)
    pub stop_trees_path: PathBuf,
    /// Opportunity grids registered under their names
    #[serde(default)]
    pub grids: Vec<GridSource>,
    /// Transit network metadata (JSON). Overrides any metadata embedded in
    /// the query.
    #[serde(default)]
    pub transitive_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSource {
    pub name: String,
    pub path: PathBuf,
}

impl NetworkConfig {
    pub fn new(query_path: impl Into<PathBuf>, stop_trees_path: impl Into<PathBuf>) -> Self {
        Self {
            query_path: query_path.into(),
            stop_trees_path: stop_trees_path.into(),
            grids: Vec::new(),
            transitive_path: None,
        }
    }

    #[must_use]
    pub fn with_grid(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.grids.push(GridSource {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    #[must_use]
    pub fn with_transitive_network(mut self, path: impl Into<PathBuf>) -> Self {
        self.transitive_path = Some(path.into());
        self
    }
}

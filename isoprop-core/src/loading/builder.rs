use std::path::Path;
use std::sync::Arc;

use log::info;

use super::config::NetworkConfig;
use crate::Error;
use crate::model::{Grid, Network, Origin, PixelPoint, Query, StopTreeCache, TransitiveNetwork};

/// Loads a network from the files named in `config`
///
/// # Errors
///
/// Returns an error if a file is missing or unreadable, or if any payload is
/// corrupt or inconsistent with the query
pub fn load_network(config: &NetworkConfig) -> Result<Network, Error> {
    validate_config(config)?;

    info!("Reading query: {}", config.query_path.display());
    let query = Query::from_json(&std::fs::read_to_string(&config.query_path)?)?;

    info!(
        "Reading stop tree cache for {}x{} pixels: {}",
        query.width(),
        query.height(),
        config.stop_trees_path.display()
    );
    let stop_trees = StopTreeCache::from_bytes(
        &std::fs::read(&config.stop_trees_path)?,
        query.pixel_count(),
    )?;

    let mut network = Network::new(query, Arc::new(stop_trees))?;

    if let Some(path) = &config.transitive_path {
        info!("Reading transit network: {}", path.display());
        let transitive = TransitiveNetwork::from_json(&std::fs::read_to_string(path)?)?;
        network = network.with_transitive_network(Arc::new(transitive));
    }

    for source in &config.grids {
        info!("Reading grid '{}': {}", source.name, source.path.display());
        let grid = Grid::from_bytes(&std::fs::read(&source.path)?)?;
        network = network.with_grid(source.name.clone(), Arc::new(grid))?;
    }

    info!(
        "Network loaded: {} pixels, {} grids, transit metadata {}",
        network.query().pixel_count(),
        network.grids().len(),
        if network.transitive_network().is_some() {
            "present"
        } else {
            "absent"
        }
    );
    Ok(network)
}

/// Reads the origin file for the query pixel `point`
pub fn load_origin(path: impl AsRef<Path>, point: PixelPoint) -> Result<Origin, Error> {
    let path = path.as_ref();
    info!(
        "Reading origin ({}, {}): {}",
        point.x,
        point.y,
        path.display()
    );
    Origin::from_bytes(&std::fs::read(path)?, point)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    let required = [
        ("query", config.query_path.as_path()),
        ("stop tree cache", config.stop_trees_path.as_path()),
    ];
    let grids = config
        .grids
        .iter()
        .map(|source| ("grid", source.path.as_path()));
    let transitive = config
        .transitive_path
        .iter()
        .map(|path| ("transit network", path.as_path()));

    for (what, path) in required.into_iter().chain(grids).chain(transitive) {
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{what} file not found: {}", path.display()),
            )));
        }
    }

    let mut names: Vec<&str> = config.grids.iter().map(|g| g.name.as_str()).collect();
    names.sort_unstable();
    if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(Error::Configuration(format!(
            "grid '{}' is configured more than once",
            pair[0]
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::loading::codec::write_i32_stream;
    use crate::loading::config::NetworkConfig;

    fn write(dir: &TempDir, file: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(file);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const QUERY: &str = r#"{"zoom": 9, "west": 10, "north": 20, "width": 2, "height": 1,
        "transitiveData": {"routes": [], "patterns": [], "stops": []}}"#;

    #[test]
    fn loads_network_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let query = write(&dir, "query.json", QUERY.as_bytes());
        let stop_trees = write(&dir, "stop_trees.dat", &write_i32_stream(&[1, 0, 60, 0]));
        let grid = write(
            &dir,
            "jobs.grid",
            &write_i32_stream(&[9, 10, 20, 2, 1, 5, 2]),
        );

        let config = NetworkConfig::new(query, stop_trees).with_grid("jobs", grid);
        let network = load_network(&config).unwrap();

        assert_eq!(network.query().pixel_count(), 2);
        assert_eq!(network.stop_trees().reachable_stops(0).count(), 1);
        assert_eq!(network.grids().get("jobs").unwrap().data(), &[5.0, 7.0]);
        assert!(network.transitive_network().is_some());
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let query = write(&dir, "query.json", QUERY.as_bytes());
        let config = NetworkConfig::new(query, dir.path().join("absent.dat"));
        assert!(matches!(load_network(&config), Err(Error::Io(_))));
    }

    #[test]
    fn duplicate_grid_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let query = write(&dir, "query.json", QUERY.as_bytes());
        let stop_trees = write(&dir, "stop_trees.dat", &write_i32_stream(&[0, 0]));
        let grid = write(
            &dir,
            "jobs.grid",
            &write_i32_stream(&[9, 10, 20, 2, 1, 5, 2]),
        );

        let config = NetworkConfig::new(query, stop_trees)
            .with_grid("jobs", grid.clone())
            .with_grid("jobs", grid);
        assert!(matches!(
            load_network(&config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn loads_origin_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "origin.dat",
            &write_i32_stream(&[0, 30, 1, 1, 90, 60, 0, 0, 0]),
        );
        let origin = load_origin(&path, PixelPoint::new(1, 0)).unwrap();
        assert_eq!(origin.n_stops(), 1);
        assert_eq!(origin.non_transit_time(PixelPoint::new(1, 0)), 0);
    }

    #[test]
    fn config_deserializes() {
        let config: NetworkConfig = serde_json::from_str(
            r#"{"query_path": "q.json", "stop_trees_path": "st.dat",
                "grids": [{"name": "jobs", "path": "jobs.grid"}]}"#,
        )
        .unwrap();
        assert_eq!(config.grids[0].name, "jobs");
        assert!(config.transitive_path.is_none());
    }
}

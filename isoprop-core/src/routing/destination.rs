use serde::Serialize;

use super::paths::paths_and_times;
use super::transitive::{TransitiveData, build_transitive_data};
use crate::algo::surface::Surface;
use crate::model::{PathDescriptor, PixelPoint, Session};
use crate::{Error, Minutes};

/// Everything shown for one destination of the current surface
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationData {
    pub paths: Vec<Option<PathDescriptor>>,
    pub times: Vec<Minutes>,
    /// Present when the network carries transit metadata
    pub transitive: Option<TransitiveData>,
    pub travel_time: Minutes,
    pub wait_time: Minutes,
    pub in_vehicle_travel_time: Minutes,
    /// Reported on its own: summary statistics of the components do not add
    /// up to the statistic of the total
    pub walk_time: Minutes,
}

/// Paths, per-minute times, journeys and surface values for `to`
///
/// # Errors
///
/// [`Error::OutOfBounds`] if `to` is outside the query, and
/// [`Error::Configuration`] if `surface` was generated for another query
pub fn generate_destination_data(
    session: &Session,
    surface: &Surface,
    to: PixelPoint,
) -> Result<DestinationData, Error> {
    if surface.extent != session.query().extent {
        return Err(Error::Configuration(
            "surface was generated for a different query".to_string(),
        ));
    }
    let index = surface
        .index(i64::from(to.x), i64::from(to.y))
        .ok_or(Error::OutOfBounds {
            x: i64::from(to.x),
            y: i64::from(to.y),
        })?;

    let result = paths_and_times(session, to);
    let transitive = session
        .network()
        .transitive_network()
        .map(|network| build_transitive_data(session, network, to, &result.paths, &result.times));

    Ok(DestinationData {
        paths: result.paths,
        times: result.times,
        transitive,
        travel_time: surface.travel_times[index],
        wait_time: surface.wait_times[index],
        in_vehicle_travel_time: surface.in_vehicle_travel_times[index],
        walk_time: surface.walk_times[index],
    })
}

//! Journeys in the transit-visualization schema for one origin/destination
//! pair.

use log::{debug, warn};
use serde::Serialize;

use super::ranking::{filter_paths, rank_paths};
use crate::Minutes;
use crate::algo::mercator::pixel_to_point;
use crate::model::{
    PathDescriptor, PixelPoint, Query, Session, StopPatternStop, TransitiveNetwork,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub place_id: String,
    pub place_name: String,
    pub place_lat: f64,
    pub place_lon: f64,
}

impl Place {
    fn at_query_pixel(id: &str, name: &str, query: &Query, point: PixelPoint) -> Self {
        let location = pixel_to_point(
            f64::from(query.extent.west) + f64::from(point.x),
            f64::from(query.extent.north) + f64::from(point.y),
            query.extent.zoom,
        );
        Self {
            place_id: id.to_string(),
            place_name: name.to_string(),
            place_lat: location.y(),
            place_lon: location.x(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Endpoint {
    Place { place_id: String },
    Stop { stop_id: String },
}

impl Endpoint {
    fn place(id: &str) -> Self {
        Endpoint::Place {
            place_id: id.to_string(),
        }
    }

    fn stop(stop: usize) -> Self {
        Endpoint::Stop {
            stop_id: stop.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Segment {
    Walk {
        from: Endpoint,
        to: Endpoint,
    },
    Transit {
        pattern_id: String,
        from_stop_index: usize,
        to_stop_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    pub journey_id: usize,
    pub journey_name: String,
    pub segments: Vec<Segment>,
}

/// Places and journeys, followed by the network's own fields
#[derive(Debug, Clone, Serialize)]
pub struct TransitiveData {
    pub places: Vec<Place>,
    pub journeys: Vec<Journey>,
    #[serde(flatten)]
    pub network: TransitiveNetwork,
}

const ORIGIN_PLACE: &str = "from";
const DESTINATION_PLACE: &str = "to";

/// Builds display journeys for the paths reaching `to`.
///
/// `paths` and `times` come from [`paths_and_times`](super::paths_and_times)
/// for the same destination.
pub fn build_transitive_data(
    session: &Session,
    network: &TransitiveNetwork,
    to: PixelPoint,
    paths: &[Option<PathDescriptor>],
    times: &[Minutes],
) -> TransitiveData {
    let query = session.query();
    let origin = session.origin();

    let places = vec![
        Place::at_query_pixel(ORIGIN_PLACE, "Origin", query, origin.point()),
        Place::at_query_pixel(DESTINATION_PLACE, "Destination", query, to),
    ];

    // anomalous paths were already logged while reconstructing
    let reconstructed: Vec<Vec<StopPatternStop>> = rank_paths(paths, times)
        .into_iter()
        .filter_map(|descriptor| origin.path(descriptor))
        .collect();

    let journeys: Vec<Journey> = filter_paths(reconstructed, network)
        .iter()
        .enumerate()
        .filter_map(|(id, path)| build_journey(id, path, network))
        .collect();

    debug!(
        "{} journeys from ({}, {}) to ({}, {})",
        journeys.len(),
        origin.point().x,
        origin.point().y,
        to.x,
        to.y
    );

    TransitiveData {
        places,
        journeys,
        network: network.clone(),
    }
}

/// Walk, ride, transfer on foot where stops differ, ride, walk.
/// `None` when a leg cannot be located in the network metadata.
fn build_journey(
    id: usize,
    path: &[StopPatternStop],
    network: &TransitiveNetwork,
) -> Option<Journey> {
    let mut segments = Vec::with_capacity(path.len() * 2 + 1);

    let Some(first) = path.first() else {
        segments.push(Segment::Walk {
            from: Endpoint::place(ORIGIN_PLACE),
            to: Endpoint::place(DESTINATION_PLACE),
        });
        return Some(Journey {
            journey_id: id,
            journey_name: id.to_string(),
            segments,
        });
    };

    segments.push(Segment::Walk {
        from: Endpoint::place(ORIGIN_PLACE),
        to: Endpoint::stop(first.board_stop),
    });

    let mut previous_stop = None;
    for leg in path {
        let pattern_id = leg.pattern.to_string();
        let Some(pattern) = network.pattern(&pattern_id) else {
            warn!("journey {id} rides pattern {pattern_id} which is not in the network");
            return None;
        };
        let from_index = pattern.stop_index_from(&leg.board_stop.to_string(), 0);
        let to_index =
            from_index.and_then(|from| pattern.stop_index_from(&leg.alight_stop.to_string(), from));
        let (Some(from_stop_index), Some(to_stop_index)) = (from_index, to_index) else {
            warn!(
                "pattern {pattern_id} does not serve stop {} before stop {}, dropping journey {id}",
                leg.board_stop, leg.alight_stop
            );
            return None;
        };

        if let Some(previous) = previous_stop.filter(|&stop| stop != leg.board_stop) {
            segments.push(Segment::Walk {
                from: Endpoint::stop(previous),
                to: Endpoint::stop(leg.board_stop),
            });
        }

        segments.push(Segment::Transit {
            pattern_id,
            from_stop_index,
            to_stop_index,
        });
        previous_stop = Some(leg.alight_stop);
    }

    if let Some(last) = previous_stop {
        segments.push(Segment::Walk {
            from: Endpoint::stop(last),
            to: Endpoint::place(DESTINATION_PLACE),
        });
    }

    Some(Journey {
        journey_id: id,
        journey_name: id.to_string(),
        segments,
    })
}

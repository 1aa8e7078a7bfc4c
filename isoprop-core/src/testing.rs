//! Builders for small in-memory networks used across unit tests.
//!
//! Values are given absolute and delta-coded here the way the routing backend
//! writes them.

use std::sync::Arc;

use crate::loading::codec::delta_encode;
use crate::model::{
    Extent, Network, Origin, PixelPoint, Query, Session, StopTreeCache, TransitiveNetwork,
};

/// Per-minute values and recorded paths of one stop, absolute, `-1` for
/// unreachable
#[derive(Debug, Clone, Default)]
pub(crate) struct StopFixture {
    pub travel: Vec<i32>,
    pub in_vehicle: Vec<i32>,
    pub wait: Vec<i32>,
    pub path: Vec<i32>,
    pub paths: Vec<Vec<[i32; 3]>>,
}

impl StopFixture {
    /// Travel times only: no riding, no waiting, path 0
    pub fn travel(travel: &[i32]) -> Self {
        let idle = travel
            .iter()
            .map(|&t| if t < 0 { -1 } else { 0 })
            .collect::<Vec<_>>();
        Self {
            travel: travel.to_vec(),
            in_vehicle: idle.clone(),
            wait: idle,
            path: vec![0; travel.len()],
            paths: Vec::new(),
        }
    }
}

pub(crate) fn encode_origin(
    radius: i32,
    walk: &[i32],
    n_minutes: usize,
    stops: &[StopFixture],
) -> Vec<i32> {
    let mut data = vec![radius];
    data.extend(delta_encode(walk));
    data.push(stops.len() as i32);
    data.push(n_minutes as i32);

    for stop in stops {
        let travel = delta_encode(&stop.travel);
        let in_vehicle = delta_encode(&stop.in_vehicle);
        let wait = delta_encode(&stop.wait);
        let path = delta_encode(&stop.path);
        for minute in 0..n_minutes {
            data.extend([
                travel[minute],
                in_vehicle[minute],
                wait[minute],
                path[minute],
            ]);
        }
        data.push(stop.paths.len() as i32);
        for path in &stop.paths {
            data.push(path.len() as i32);
            for segment in path {
                data.extend(segment);
            }
        }
    }
    data
}

/// Continuously delta-coded stop tree cache from absolute `(stop, seconds)`
/// lists, one per pixel
pub(crate) fn encode_stop_trees(pixels: &[Vec<(i32, i32)>]) -> Vec<i32> {
    let (mut prev_stop, mut prev_time) = (0, 0);
    let mut data = Vec::new();
    for stops in pixels {
        data.push(stops.len() as i32);
        for &(stop, time) in stops {
            data.extend([stop - prev_stop, time - prev_time]);
            prev_stop = stop;
            prev_time = time;
        }
    }
    data
}

pub(crate) fn session(
    extent: Extent,
    stop_trees: &[Vec<(i32, i32)>],
    origin: &[i32],
    point: PixelPoint,
    transitive: Option<TransitiveNetwork>,
) -> Session {
    let stop_trees =
        StopTreeCache::create(encode_stop_trees(stop_trees), extent.pixel_count()).unwrap();
    let mut network = Network::new(Query::new(extent), Arc::new(stop_trees)).unwrap();
    if let Some(transitive) = transitive {
        network = network.with_transitive_network(Arc::new(transitive));
    }
    let origin = Origin::create(origin, point).unwrap();
    Session::new(Arc::new(network), Arc::new(origin)).unwrap()
}

/// Three pixels in a row at zoom 9, origin on the first.
///
/// - pixel 0: the origin, no stops
/// - pixel 1: walkable in 5 minutes, stop 0 at 60s
/// - pixel 2: not walkable, stop 0 at 120s and stop 1 at 60s
///
/// Stop 0 records paths `[(5, 1, 0)]` and `[(5, 1, 3), (3, 2, 0)]`, stop 1
/// records `[(4, 3, 1)]`. Over four minutes pixel 2 is reached by
/// `(0, 0)`, `(0, 1)`, `(0, 1)` and `(1, 0)` in 12, 6, 5 and 6 minutes.
pub(crate) fn row_session(transitive: Option<TransitiveNetwork>) -> Session {
    let extent = Extent {
        zoom: 9,
        west: 100,
        north: 200,
        width: 3,
        height: 1,
    };
    let walk = [-1, -1, -1, -1, 0, 300, -1, -1, -1];
    let stops = [
        StopFixture {
            travel: vec![600, 240, 180, -1],
            in_vehicle: vec![300, 120, 120, -1],
            wait: vec![60, 0, 0, -1],
            path: vec![0, 1, 1, 0],
            paths: vec![vec![[5, 1, 0]], vec![[5, 1, 3], [3, 2, 0]]],
        },
        StopFixture {
            travel: vec![660, 600, 540, 300],
            in_vehicle: vec![400, 400, 400, 200],
            wait: vec![200, 140, 80, 40],
            path: vec![0, 0, 0, 0],
            paths: vec![vec![[4, 3, 1]]],
        },
    ];
    session(
        extent,
        &[vec![], vec![(0, 60)], vec![(0, 120), (1, 60)]],
        &encode_origin(1, &walk, 4, &stops),
        PixelPoint::new(0, 0),
        transitive,
    )
}

pub(crate) fn row_network() -> TransitiveNetwork {
    TransitiveNetwork::from_json(
        r#"{
            "routes": [{"route_id": "red"}, {"route_id": "blue"}, {"route_id": "green"}],
            "patterns": [
                {"pattern_id": "1", "route_id": "red",
                 "stops": [{"stop_id": "5"}, {"stop_id": "3"}, {"stop_id": "7"}, {"stop_id": "0"}]},
                {"pattern_id": "2", "route_id": "blue",
                 "stops": [{"stop_id": "3"}, {"stop_id": "0"}]},
                {"pattern_id": "3", "route_id": "green",
                 "stops": [{"stop_id": "4"}, {"stop_id": "1"}]}
            ],
            "stops": []
        }"#,
    )
    .unwrap()
}

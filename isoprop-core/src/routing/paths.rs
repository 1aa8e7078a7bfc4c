use serde::Serialize;

use crate::model::{PathDescriptor, PixelPoint, Session};
use crate::propagation::transit_minutes;
use crate::{Minutes, UNREACHABLE};

/// Best travel time to one destination at each departure minute and the
/// recorded path that achieves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathsAndTimes {
    /// `None` where the destination is unreachable
    pub paths: Vec<Option<PathDescriptor>>,
    pub times: Vec<Minutes>,
}

/// Replays propagation for the single pixel `to`, keeping track of which
/// stop and recorded path won each minute.
///
/// Walking seeds every minute, so transit only shows up where it is strictly
/// faster. Points outside the query get the walk-only arrays.
pub fn paths_and_times(session: &Session, to: PixelPoint) -> PathsAndTimes {
    let origin = session.origin();
    let n_minutes = origin.n_minutes();

    let non_transit_time = origin.non_transit_time(to);
    let mut times = vec![non_transit_time; n_minutes];
    let walk = (non_transit_time < UNREACHABLE).then_some(PathDescriptor::Walk);
    let mut paths = vec![walk; n_minutes];

    let Some(pixel) = session
        .query()
        .extent
        .pixel_index(i64::from(to.x), i64::from(to.y))
    else {
        return PathsAndTimes { paths, times };
    };

    for access in session.network().stop_trees().reachable_stops(pixel) {
        let Some(iterations) = origin.stop_iterations(access.stop) else {
            continue;
        };
        for (minute, iteration) in iterations.iter().enumerate() {
            if let Some(time) = transit_minutes(iteration, access.access_time) {
                if time < times[minute] {
                    times[minute] = time;
                    paths[minute] = Some(PathDescriptor::Transit {
                        stop: access.stop,
                        path_index: iteration.path_index,
                    });
                }
            }
        }
    }

    PathsAndTimes { paths, times }
}

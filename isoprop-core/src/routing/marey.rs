use serde::Serialize;

use super::paths::paths_and_times;
use super::ranking::clear_waiting_duplicates;
use crate::model::{PathDescriptor, PixelPoint, Session, StopPatternStop};
use crate::{Minutes, StopId, UNREACHABLE};

/// Input for a Marey plot of the trips reaching one destination: one line
/// per departure minute, one band per transit round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MareyData {
    /// Travel times in departure order
    pub times: Vec<Minutes>,
    /// Descriptors in departure order, waiting duplicates cleared
    pub paths: Vec<Option<PathDescriptor>>,
    /// Reconstructed legs for each entry of `paths`
    pub segments: Vec<Option<Vec<StopPatternStop>>>,
    /// Latest arrival, as minutes after the first departure
    pub max_time: u32,
    /// Stops boarded or transferred at in each round, in first-seen order.
    /// The final alighting stop is not listed.
    pub stops_per_round: Vec<Vec<StopId>>,
}

pub fn marey_data(session: &Session, to: PixelPoint) -> MareyData {
    let origin = session.origin();
    let mut result = paths_and_times(session, to);

    result.times.reverse();
    result.paths.reverse();
    clear_waiting_duplicates(&mut result.paths, &result.times);

    let segments: Vec<Option<Vec<StopPatternStop>>> = result
        .paths
        .iter()
        .map(|path| path.and_then(|descriptor| origin.path(descriptor)))
        .collect();

    let max_time = result
        .times
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t != UNREACHABLE)
        .map(|(minute, &t)| u32::from(t) + minute as u32)
        .max()
        .unwrap_or(0);

    let mut stops_per_round: Vec<Vec<StopId>> = Vec::new();
    let mut add = |round: usize, stop: StopId| {
        if stops_per_round.len() <= round {
            stops_per_round.resize_with(round + 1, Vec::new);
        }
        if !stops_per_round[round].contains(&stop) {
            stops_per_round[round].push(stop);
        }
    };
    for path in segments.iter().flatten() {
        for (round, leg) in path.iter().enumerate() {
            add(round, leg.board_stop);
            if round + 1 < path.len() {
                add(round + 1, leg.alight_stop);
            }
        }
    }

    MareyData {
        times: result.times,
        paths: result.paths,
        segments,
        max_time,
        stops_per_round,
    }
}

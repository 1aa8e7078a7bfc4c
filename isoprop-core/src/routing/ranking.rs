//! Choosing the few recorded paths worth showing for a destination.

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, warn};

use crate::model::{PathDescriptor, StopPatternStop, TransitiveNetwork};
use crate::{MAX_TRANSITIVE_PATHS, Minutes, PatternId};

/// Clears entries that only wait a minute longer for the same trip as the
/// next departure.
///
/// Expects departure order (earliest first): entry `p` is dropped when it
/// takes the same path as `p + 1` and arrives exactly one minute later.
pub fn clear_waiting_duplicates(paths: &mut [Option<PathDescriptor>], times: &[Minutes]) {
    for p in 0..paths.len().saturating_sub(1) {
        let same_trip = paths[p].is_some() && paths[p] == paths[p + 1];
        if same_trip && u16::from(times[p]) == u16::from(times[p + 1]) + 1 {
            paths[p] = None;
        }
    }
}

/// Up to [`MAX_TRANSITIVE_PATHS`] distinct descriptors, most frequent first.
///
/// `paths` and `times` are per departure minute as produced by
/// [`paths_and_times`](super::paths_and_times), i.e. latest departure first.
/// Waiting duplicates are collapsed before counting.
pub fn rank_paths(paths: &[Option<PathDescriptor>], times: &[Minutes]) -> Vec<PathDescriptor> {
    let mut paths: Vec<_> = paths.iter().rev().copied().collect();
    let times: Vec<_> = times.iter().rev().copied().collect();
    clear_waiting_duplicates(&mut paths, &times);

    let mut used: Vec<PathDescriptor> = paths.into_iter().flatten().collect();
    let n_used = used.len();
    used.sort_unstable();

    let mut counted: Vec<(usize, PathDescriptor)> = used.into_iter().dedup_with_count().collect();
    counted.reverse();
    counted.sort_by(|a, b| b.0.cmp(&a.0));

    debug!("{} unique paths over {n_used} minutes", counted.len());
    if let Some((count, _)) = counted.get(MAX_TRANSITIVE_PATHS) {
        debug!(
            "eliminated {} paths with frequency less than or equal to {count} / {n_used}",
            counted.len() - MAX_TRANSITIVE_PATHS
        );
    }

    counted
        .into_iter()
        .take(MAX_TRANSITIVE_PATHS)
        .map(|(_, path)| path)
        .dedup()
        .collect()
}

/// Maps pattern indices to route indices through the network metadata
struct RouteLookup<'a> {
    network: &'a TransitiveNetwork,
    by_pattern: HashMap<&'a str, Option<usize>>,
}

impl<'a> RouteLookup<'a> {
    fn new(network: &'a TransitiveNetwork) -> Self {
        let by_pattern = network
            .patterns
            .iter()
            .map(|p| (p.pattern_id.as_str(), network.route_index(&p.route_id)))
            .collect();
        Self {
            network,
            by_pattern,
        }
    }

    fn route(&self, pattern: PatternId) -> Option<usize> {
        let id = pattern.to_string();
        let route = self.by_pattern.get(id.as_str()).copied().flatten();
        if route.is_none() {
            warn!(
                "pattern {pattern} has no route in a network of {} patterns",
                self.network.patterns.len()
            );
        }
        route
    }

    fn routes_of(&self, path: &[StopPatternStop]) -> Vec<Option<usize>> {
        path.iter()
            .map(|segment| self.route(segment.pattern))
            .collect()
    }
}

/// Heuristic reduction of reconstructed paths.
///
/// Paths riding the same sequence of routes are collapsed into one (they only
/// differ in transfer stops), then a path is dropped when a shorter path rides
/// a subset of its routes (it only adds a short access, egress or transfer
/// leg). A walk-only path rides no routes and so supersedes every other path.
pub fn filter_paths(
    paths: Vec<Vec<StopPatternStop>>,
    network: &TransitiveNetwork,
) -> Vec<Vec<StopPatternStop>> {
    let n_in = paths.len();
    let lookup = RouteLookup::new(network);

    let mut keyed: Vec<(Vec<Option<usize>>, Vec<StopPatternStop>)> = paths
        .into_iter()
        .map(|path| (lookup.routes_of(&path), path))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    keyed.dedup_by(|(a, _), (b, _)| a == b);
    let n_distinct = keyed.len();

    let kept: Vec<Vec<StopPatternStop>> = keyed
        .iter()
        .filter(|(routes, _)| {
            !keyed.iter().any(|(other, _)| {
                other.len() < routes.len() && other.iter().all(|route| routes.contains(route))
            })
        })
        .map(|(_, path)| path.clone())
        .collect();

    debug!(
        "filtering reduced {n_in} paths to {n_distinct} after multiple-stop elimination, to {} \
         after stemming",
        kept.len()
    );
    kept
}

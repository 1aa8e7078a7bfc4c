//! Propagation of stop travel times to every pixel of the query.
//!
//! For each pixel the origin's walk-only time seeds four per-minute arrays;
//! every stop reachable from the pixel then competes minute by minute, and a
//! stop replaces the current entry only when it is strictly faster. Iteration
//! order over stops is therefore observable: on ties the first stop wins.

mod cancel;

pub use cancel::CancellationToken;

use crate::model::{PixelPoint, Session, StopIteration, seconds_to_minutes};
use crate::{Error, Minutes, UNREACHABLE};

/// Per-minute times for one destination pixel, in minutes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelTimes {
    pub travel_times: Vec<Minutes>,
    pub wait_times: Vec<Minutes>,
    pub in_vehicle_times: Vec<Minutes>,
    pub walk_times: Vec<Minutes>,
}

impl PixelTimes {
    pub fn new(n_minutes: usize) -> Self {
        Self {
            travel_times: vec![UNREACHABLE; n_minutes],
            wait_times: vec![UNREACHABLE; n_minutes],
            in_vehicle_times: vec![UNREACHABLE; n_minutes],
            walk_times: vec![UNREACHABLE; n_minutes],
        }
    }

    pub fn n_minutes(&self) -> usize {
        self.travel_times.len()
    }

    /// Walking involves neither waiting nor riding
    fn reset(&mut self, non_transit_time: Minutes) {
        self.travel_times.fill(non_transit_time);
        self.walk_times.fill(non_transit_time);
        self.wait_times.fill(UNREACHABLE);
        self.in_vehicle_times.fill(UNREACHABLE);
    }
}

/// Travel time in minutes to a pixel `access_time` seconds away from the stop
/// reached by `iteration`, `None` if the stop is unreachable at that minute
#[inline]
pub(crate) fn transit_minutes(iteration: &StopIteration, access_time: u32) -> Option<Minutes> {
    iteration
        .travel_time
        .seconds()
        .map(|seconds| seconds_to_minutes(seconds.saturating_add(access_time)))
}

/// Runs propagation over the query of a [`Session`]
#[derive(Debug, Clone, Copy)]
pub struct Propagator<'a> {
    session: &'a Session,
}

impl<'a> Propagator<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn n_minutes(&self) -> usize {
        self.session.origin().n_minutes()
    }

    pub fn width(&self) -> usize {
        self.session.query().width()
    }

    pub fn height(&self) -> usize {
        self.session.query().height()
    }

    /// Fills `times` for the pixel at `(x, y)` of the query
    pub fn propagate_pixel(&self, x: usize, y: usize, times: &mut PixelTimes) {
        let origin = self.session.origin();
        let query = self.session.query();
        let point = PixelPoint::new(x as i32, y as i32);

        times.reset(origin.non_transit_time(point));

        let Some(pixel) = query.extent.pixel_index(x as i64, y as i64) else {
            return;
        };

        for access in self.session.network().stop_trees().reachable_stops(pixel) {
            // stop ids were checked against the origin when the session was built
            let Some(iterations) = origin.stop_iterations(access.stop) else {
                continue;
            };

            for (minute, iteration) in iterations.iter().enumerate() {
                let Some(candidate) = transit_minutes(iteration, access.access_time) else {
                    continue;
                };
                if candidate >= times.travel_times[minute] {
                    continue;
                }

                let in_vehicle = iteration.in_vehicle_time.seconds().unwrap_or(0);
                let wait = iteration.wait_time.seconds().unwrap_or(0);
                let total = iteration
                    .travel_time
                    .seconds()
                    .unwrap_or(0)
                    .saturating_add(access.access_time);

                times.travel_times[minute] = candidate;
                times.in_vehicle_times[minute] = iteration.in_vehicle_time.minutes();
                times.wait_times[minute] = iteration.wait_time.minutes();
                times.walk_times[minute] =
                    seconds_to_minutes(total.saturating_sub(in_vehicle).saturating_sub(wait));
            }
        }
    }

    /// Propagates the pixels of row `y`, handing each to `next` in order
    pub fn propagate_row<F>(&self, y: usize, times: &mut PixelTimes, mut next: F)
    where
        F: FnMut(usize, &PixelTimes),
    {
        for x in 0..self.width() {
            self.propagate_pixel(x, y, times);
            next(x, times);
        }
    }

    /// Visits every pixel of the query in row-major order.
    ///
    /// `cancel` is checked before each row.
    pub fn propagate<F>(&self, cancel: &CancellationToken, mut next: F) -> Result<(), Error>
    where
        F: FnMut(usize, usize, &PixelTimes),
    {
        let mut times = PixelTimes::new(self.n_minutes());
        for y in 0..self.height() {
            cancel.check()?;
            self.propagate_row(y, &mut times, |x, times| next(x, y, times));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{Extent, Network, Origin, Query, StopTreeCache};

    /// 2x1 query, origin at (0, 0) walking to itself only.
    /// Pixel 0 reaches stop 0 in 60s; pixel 1 reaches stop 0 in 120s and
    /// stop 1 in 60s. Two departure minutes.
    fn session() -> Session {
        let query = Query::new(Extent {
            zoom: 9,
            west: 0,
            north: 0,
            width: 2,
            height: 1,
        });
        let stop_trees = StopTreeCache::create(vec![1, 0, 60, 2, 0, 60, 1, -60], 2).unwrap();
        let network = Network::new(query, Arc::new(stop_trees)).unwrap();

        let mut data = vec![0, 0, 2, 2];
        // stop 0: 300s (120 riding, 60 waiting), then unreachable
        data.extend([300, 120, 60, 0, -301, -121, -61, 0, 0]);
        // stop 1: 360s (300 waiting), then 100s
        data.extend([360, 0, 300, 0, -260, 0, -300, 0, 0]);
        let origin = Origin::create(&data, PixelPoint::new(0, 0)).unwrap();

        Session::new(Arc::new(network), Arc::new(origin)).unwrap()
    }

    #[test]
    fn walking_beats_slower_transit() {
        let session = session();
        let propagator = Propagator::new(&session);
        let mut times = PixelTimes::new(propagator.n_minutes());
        propagator.propagate_pixel(0, 0, &mut times);

        assert_eq!(times.travel_times, vec![0, 0]);
        assert_eq!(times.walk_times, vec![0, 0]);
        assert_eq!(times.wait_times, vec![UNREACHABLE, UNREACHABLE]);
        assert_eq!(times.in_vehicle_times, vec![UNREACHABLE, UNREACHABLE]);
    }

    #[test]
    fn first_stop_wins_ties() {
        let session = session();
        let propagator = Propagator::new(&session);
        let mut times = PixelTimes::new(propagator.n_minutes());
        propagator.propagate_pixel(1, 0, &mut times);

        // minute 0: both stops give 7 minutes, stop 0 came first
        assert_eq!(times.travel_times[0], 7);
        assert_eq!(times.in_vehicle_times[0], 2);
        assert_eq!(times.wait_times[0], 1);
        assert_eq!(times.walk_times[0], 4);

        // minute 1: stop 0 is unreachable, stop 1 arrives at 100s + 60s
        assert_eq!(times.travel_times[1], 2);
        assert_eq!(times.in_vehicle_times[1], 0);
        assert_eq!(times.wait_times[1], 0);
        assert_eq!(times.walk_times[1], 2);
    }

    #[test]
    fn scratch_buffers_are_reset_between_pixels() {
        let session = session();
        let propagator = Propagator::new(&session);
        let mut times = PixelTimes::new(propagator.n_minutes());
        propagator.propagate_pixel(1, 0, &mut times);
        propagator.propagate_pixel(0, 0, &mut times);
        assert_eq!(times.wait_times, vec![UNREACHABLE, UNREACHABLE]);
    }

    #[test]
    fn visits_pixels_in_row_major_order() {
        let session = session();
        let mut visited = Vec::new();
        Propagator::new(&session)
            .propagate(&CancellationToken::new(), |x, y, times| {
                visited.push((x, y, times.travel_times.clone()))
            })
            .unwrap();
        assert_eq!(visited, vec![(0, 0, vec![0, 0]), (1, 0, vec![7, 2])]);
    }

    #[test]
    fn cancelled_propagation_stops() {
        let session = session();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut calls = 0;
        let result = Propagator::new(&session).propagate(&cancel, |_, _, _| calls += 1);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(calls, 0);
    }
}

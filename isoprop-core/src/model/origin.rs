//! Travel times and recorded paths from a single origin pixel

use log::{debug, error, info, warn};
use serde::Serialize;

use super::extent::PixelPoint;
use super::path::{PathDescriptor, StopPatternStop};
use super::travel_time::TravelTime;
use crate::loading::codec::{DeltaDecoder, IntCursor, read_i32_stream};
use crate::{Error, ITERATION_WIDTH, MAX_PATH_SEGMENTS, Minutes, StopId, UNREACHABLE};

/// Best known way to reach a stop when leaving the origin at one departure
/// minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StopIteration {
    pub travel_time: TravelTime,
    pub in_vehicle_time: TravelTime,
    pub wait_time: TravelTime,
    /// Index into the stop's path table
    pub path_index: i32,
}

/// Decoded origin file.
///
/// Layout (little-endian `i32`):
/// `[radius, walk times (delta)[(2r+1)^2], nStops, nMinutes, stop blocks...]`
/// where each stop block is `[(travel, inVehicle, wait, path) (delta)[nMinutes],
/// nPaths, (nSegments, (board, pattern, alight)[nSegments])[nPaths]]`.
#[derive(Debug, Clone)]
pub struct Origin {
    point: PixelPoint,
    radius: usize,
    non_transit_times: Vec<TravelTime>,
    n_minutes: usize,
    iterations: Vec<StopIteration>,
    /// stop -> first iteration of that stop
    index: Vec<usize>,
    /// Concatenated path tables, `[nSegments, segments...]` per path
    paths: Vec<i32>,
    /// stop -> first path of that stop in `paths`
    path_offsets: Vec<usize>,
    path_counts: Vec<usize>,
}

/// Summary of an origin without its tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginInfo {
    pub x: i32,
    pub y: i32,
    pub radius: usize,
    pub n_stops: usize,
    pub n_minutes: usize,
}

impl Origin {
    /// Decodes an origin for the pixel `point` of the query.
    ///
    /// Stops appear in the order the backend numbered them, so a block's
    /// position is its stop id.
    pub fn create(data: &[i32], point: PixelPoint) -> Result<Self, Error> {
        let mut cursor = IntCursor::new(data, "origin data");

        let radius = cursor.read_count("radius")?;
        let diameter = radius
            .checked_mul(2)
            .and_then(|d| d.checked_add(1))
            .ok_or_else(|| Error::CorruptData(format!("origin radius {radius} overflows")))?;
        let n_pixels = diameter
            .checked_mul(diameter)
            .ok_or_else(|| Error::CorruptData(format!("origin radius {radius} overflows")))?;

        let mut acc = DeltaDecoder::default();
        let non_transit_times = cursor
            .take(n_pixels)?
            .iter()
            .map(|&delta| TravelTime::from_wire(acc.next(delta)))
            .collect::<Result<Vec<_>, _>>()?;

        let n_stops = cursor.read_count("stop count")?;
        let n_minutes = cursor.read_count("minute count")?;
        let block_len = n_minutes.checked_mul(ITERATION_WIDTH).ok_or_else(|| {
            Error::CorruptData(format!("origin minute count {n_minutes} overflows"))
        })?;

        let mut iterations = Vec::with_capacity(n_stops.saturating_mul(n_minutes).min(data.len()));
        let mut index = Vec::with_capacity(n_stops.min(data.len()));
        let mut paths = Vec::new();
        let mut path_offsets = Vec::with_capacity(n_stops.min(data.len()));
        let mut path_counts = Vec::with_capacity(n_stops.min(data.len()));

        for stop in 0..n_stops {
            index.push(iterations.len());

            // delta coding restarts with every stop
            let mut travel = DeltaDecoder::default();
            let mut in_vehicle = DeltaDecoder::default();
            let mut wait = DeltaDecoder::default();
            let mut path = DeltaDecoder::default();

            for quad in cursor.take(block_len)?.chunks_exact(ITERATION_WIDTH) {
                iterations.push(StopIteration {
                    travel_time: TravelTime::from_wire(travel.next(quad[0]))
                        .map_err(|e| stop_error(stop, e))?,
                    in_vehicle_time: TravelTime::from_wire(in_vehicle.next(quad[1]))
                        .map_err(|e| stop_error(stop, e))?,
                    wait_time: TravelTime::from_wire(wait.next(quad[2]))
                        .map_err(|e| stop_error(stop, e))?,
                    path_index: path.next(quad[3]),
                });
            }

            let n_paths = cursor.read_count("path count")?;
            path_offsets.push(paths.len());
            path_counts.push(n_paths);
            for _ in 0..n_paths {
                let n_segments = cursor.read_count("segment count")?;
                let segments = cursor.take(n_segments.checked_mul(3).ok_or_else(|| {
                    Error::CorruptData(format!("segment count {n_segments} overflows"))
                })?)?;
                paths.push(n_segments as i32);
                paths.extend_from_slice(segments);
            }
        }

        let consumed = cursor.position();
        cursor.finish()?;

        info!(
            "Loaded origin ({}, {}): radius {radius}, {n_stops} stops, {n_minutes} minutes",
            point.x, point.y
        );
        debug!("Origin payload of {consumed} ints fully consumed");

        Ok(Self {
            point,
            radius,
            non_transit_times,
            n_minutes,
            iterations,
            index,
            paths,
            path_offsets,
            path_counts,
        })
    }

    pub fn from_bytes(bytes: &[u8], point: PixelPoint) -> Result<Self, Error> {
        Self::create(&read_i32_stream(bytes)?, point)
    }

    pub fn point(&self) -> PixelPoint {
        self.point
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn n_stops(&self) -> usize {
        self.index.len()
    }

    pub fn n_minutes(&self) -> usize {
        self.n_minutes
    }

    pub fn info(&self) -> OriginInfo {
        OriginInfo {
            x: self.point.x,
            y: self.point.y,
            radius: self.radius,
            n_stops: self.n_stops(),
            n_minutes: self.n_minutes,
        }
    }

    /// Walk-only travel time to `point` in minutes, or [`UNREACHABLE`] when
    /// the point is outside the walking neighbourhood or cannot be walked to
    pub fn non_transit_time(&self, point: PixelPoint) -> Minutes {
        let radius = self.radius as i64;
        let relx = i64::from(point.x) - i64::from(self.point.x);
        let rely = i64::from(point.y) - i64::from(self.point.y);

        if relx.abs() > radius || rely.abs() > radius {
            return UNREACHABLE;
        }

        let diameter = radius * 2 + 1;
        let pixel = ((rely + radius) * diameter + relx + radius) as usize;
        self.non_transit_times[pixel].minutes()
    }

    /// Per-minute results for `stop`, `None` for stops the origin does not cover
    #[inline]
    pub fn stop_iterations(&self, stop: StopId) -> Option<&[StopIteration]> {
        self.index
            .get(stop)
            .map(|&offset| &self.iterations[offset..offset + self.n_minutes])
    }

    /// Reconstructs the path identified by `descriptor`.
    ///
    /// Walking yields an empty path. Descriptors that do not resolve, and
    /// paths longer than [`MAX_PATH_SEGMENTS`], point to corrupt data upstream:
    /// they are logged and reported as `None`.
    pub fn path(&self, descriptor: PathDescriptor) -> Option<Vec<StopPatternStop>> {
        let (stop, path_index) = match descriptor {
            PathDescriptor::Walk => {
                warn!(
                    "Path requested for a walk-only trip from origin ({}, {}), returning no segments",
                    self.point.x, self.point.y
                );
                return Some(Vec::new());
            }
            PathDescriptor::Transit { stop, path_index } => (stop, path_index),
        };

        let Some(&first) = self.path_offsets.get(stop) else {
            error!(
                "Path {path_index} requested for stop {stop} but origin ({}, {}) covers only {} stops",
                self.point.x,
                self.point.y,
                self.n_stops()
            );
            return None;
        };

        let n_paths = self.path_counts[stop];
        let Some(path_index) = usize::try_from(path_index).ok().filter(|&p| p < n_paths) else {
            error!(
                "Path {path_index} requested for stop {stop} which records {n_paths} paths (origin {}, {})",
                self.point.x, self.point.y
            );
            return None;
        };

        // seek forward to the requested path; table sizes were checked on load
        let mut offset = first;
        for _ in 0..path_index {
            offset += 1 + self.paths[offset] as usize * 3;
        }

        let n_segments = self.paths[offset] as usize;
        if n_segments > MAX_PATH_SEGMENTS {
            error!(
                "Too many path segments ({n_segments} > {MAX_PATH_SEGMENTS}) in path {path_index} \
                 to stop {stop} from origin ({}, {}), returning no path. This implies a bug upstream",
                self.point.x, self.point.y
            );
            return None;
        }

        let segments = &self.paths[offset + 1..offset + 1 + n_segments * 3];
        let path = segments
            .chunks_exact(3)
            .map(|seg| {
                Some(StopPatternStop {
                    board_stop: usize::try_from(seg[0]).ok()?,
                    pattern: usize::try_from(seg[1]).ok()?,
                    alight_stop: usize::try_from(seg[2]).ok()?,
                })
            })
            .collect::<Option<Vec<_>>>();

        if path.is_none() {
            error!(
                "Negative stop or pattern in path {path_index} to stop {stop} from origin ({}, {})",
                self.point.x, self.point.y
            );
        }
        path
    }

    /// Ordered `(board stop, pattern, alight stop)` legs of a recorded path.
    /// Unresolvable paths come back empty, see [`path`](Self::path).
    pub fn stop_pattern_stop_sets(&self, descriptor: PathDescriptor) -> Vec<StopPatternStop> {
        self.path(descriptor).unwrap_or_default()
    }
}

fn stop_error(stop: StopId, error: Error) -> Error {
    match error {
        Error::CorruptData(msg) => Error::CorruptData(format!("stop {stop}: {msg}")),
        other => other,
    }
}

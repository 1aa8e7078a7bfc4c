//! Travel-time surfaces, accessibility and itinerary replay over precomputed
//! public-transit routing results.
//!
//! The crate decodes the binary payloads written by the routing backend
//! (stop tree cache, per-origin travel times, opportunity grids), propagates
//! travel times from transit stops to every pixel of a query window and reduces
//! the per-departure-minute results into surfaces and accessibility figures.

pub mod algo;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod propagation;
pub mod routing;

#[cfg(test)]
mod testing;

pub use error::Error;

pub use algo::surface::{Case, Surface, SurfaceOptions, generate_surface};
pub use loading::{NetworkConfig, load_network, load_origin};
pub use model::{
    Extent, Grid, GridSet, Network, Origin, PathDescriptor, PixelPoint, Query, Session,
    SessionBuilder, StopPatternStop, StopTreeCache, TransitiveNetwork, TravelTime,
};
pub use propagation::{CancellationToken, PixelTimes, Propagator};

/// Index of a transit stop, as assigned by the routing backend
pub type StopId = usize;
/// Index of a trip pattern, as assigned by the routing backend
pub type PatternId = usize;
/// Travel time in whole minutes, `UNREACHABLE` meaning "not reached"
pub type Minutes = u8;

/// Censoring value of every minute-domain array
pub const UNREACHABLE: Minutes = 255;

/// Number of ints stored per stop per departure minute:
/// travel time, in-vehicle time, wait time and path index
pub const ITERATION_WIDTH: usize = 4;

/// Maximum path segments before a recorded path is considered corrupt.
/// Such paths are logged and dropped instead of being rendered.
pub const MAX_PATH_SEGMENTS: usize = 8;

/// Maximum number of distinct paths shown for a destination
pub const MAX_TRANSITIVE_PATHS: usize = 5;

/// Length of a spectrogram row, in minutes
pub const MAX_TRIP_LENGTH_MINUTES: usize = 120;

/// Accessibility cutoff used when none is given, in minutes
pub const DEFAULT_CUTOFF_MINUTES: Minutes = 60;

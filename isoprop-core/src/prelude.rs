pub use crate::{
    DEFAULT_CUTOFF_MINUTES, ITERATION_WIDTH, MAX_PATH_SEGMENTS, MAX_TRANSITIVE_PATHS,
    MAX_TRIP_LENGTH_MINUTES, UNREACHABLE,
};

// Re-export key components
pub use crate::algo::accessibility::{accessibility_for_cutoff, accessibility_for_grid};
pub use crate::algo::mercator;
pub use crate::algo::surface::{
    Case, Spectrogram, Surface, SurfaceOptions, compute_pixel_value, generate_surface,
};
pub use crate::loading::{GridSource, NetworkConfig, load_network, load_origin};
pub use crate::model::{
    Extent, Grid, GridSet, Network, Origin, PathDescriptor, PixelPoint, Query, Session,
    SessionBuilder, StopIteration, StopPatternStop, StopTreeCache, TransitiveNetwork, TravelTime,
};
pub use crate::propagation::{CancellationToken, PixelTimes, Propagator};
pub use crate::routing::{
    DestinationData, Endpoint, Journey, MareyData, PathsAndTimes, Place, Segment, TransitiveData,
    build_transitive_data, clear_waiting_duplicates, filter_paths, generate_destination_data,
    marey_data, paths_and_times, rank_paths,
};

pub use crate::Error;

// Core identifier types
pub use crate::Minutes;
pub use crate::PatternId;
pub use crate::StopId;

//! Data model for precomputed transit accessibility
//!
//! Decoded payloads (query, stop tree cache, origins, grids, network
//! metadata) and the immutable contexts built from them.

mod extent;
mod grid;
mod network;
mod origin;
mod path;
mod query;
mod stop_tree_cache;
mod transitive;
mod travel_time;

pub use extent::{Extent, PixelPoint};
pub use grid::{Grid, GridSet};
pub use network::{Network, Session, SessionBuilder};
pub use origin::{Origin, OriginInfo, StopIteration};
pub use path::{PathDescriptor, StopPatternStop};
pub use query::Query;
pub use stop_tree_cache::{StopAccess, StopTreeCache};
pub use transitive::{PatternStop, TransitPattern, TransitRoute, TransitStop, TransitiveNetwork};
pub use travel_time::{TravelTime, seconds_to_minutes};

//! Replaying recorded itineraries: which path reaches a destination at each
//! departure minute, which of them to show, and how to draw them.

mod destination;
mod marey;
mod paths;
mod ranking;
mod transitive;

pub use destination::{DestinationData, generate_destination_data};
pub use marey::{MareyData, marey_data};
pub use paths::{PathsAndTimes, paths_and_times};
pub use ranking::{clear_waiting_duplicates, filter_paths, rank_paths};
pub use transitive::{Endpoint, Journey, Place, Segment, TransitiveData, build_transitive_data};

use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::{PatternId, StopId};

/// Identifies one recorded itinerary: the `path_index`-th path stored for
/// `stop` in the origin file, or a walk-only trip.
///
/// Ordered by `(stop, path_index)` with walking first, matching the wire
/// ordering where walking is stop `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathDescriptor {
    Walk,
    Transit { stop: StopId, path_index: i32 },
}

impl PathDescriptor {
    /// `(stop, path)` pair as written by the backend, `(-1, -1)` for walking
    pub fn to_wire(self) -> (i64, i64) {
        match self {
            PathDescriptor::Walk => (-1, -1),
            PathDescriptor::Transit { stop, path_index } => (stop as i64, i64::from(path_index)),
        }
    }

    /// Inverse of [`to_wire`](Self::to_wire); any negative stop means walking
    pub fn from_wire(stop: i64, path_index: i64) -> Option<Self> {
        if stop < 0 {
            return Some(PathDescriptor::Walk);
        }
        Some(PathDescriptor::Transit {
            stop: StopId::try_from(stop).ok()?,
            path_index: i32::try_from(path_index).ok()?,
        })
    }
}

impl Serialize for PathDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (stop, path) = self.to_wire();
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&stop)?;
        tuple.serialize_element(&path)?;
        tuple.end()
    }
}

/// One transit leg of a recorded path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct StopPatternStop {
    pub board_stop: StopId,
    pub pattern: PatternId,
    pub alight_stop: StopId,
}

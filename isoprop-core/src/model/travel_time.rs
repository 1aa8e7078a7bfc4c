use crate::{Error, Minutes, UNREACHABLE};

/// A decoded travel time in seconds.
///
/// The wire format marks unreachable entries with `-1`; that sentinel only
/// exists at the decode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TravelTime {
    Reachable(u32),
    #[default]
    Unreachable,
}

impl TravelTime {
    pub const WIRE_UNREACHABLE: i32 = -1;

    pub fn from_wire(value: i32) -> Result<Self, Error> {
        match value {
            Self::WIRE_UNREACHABLE => Ok(TravelTime::Unreachable),
            v if v >= 0 => Ok(TravelTime::Reachable(v.unsigned_abs())),
            v => Err(Error::CorruptData(format!("invalid travel time {v}"))),
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            TravelTime::Reachable(seconds) => i32::try_from(seconds).unwrap_or(i32::MAX),
            TravelTime::Unreachable => Self::WIRE_UNREACHABLE,
        }
    }

    pub fn seconds(self) -> Option<u32> {
        match self {
            TravelTime::Reachable(seconds) => Some(seconds),
            TravelTime::Unreachable => None,
        }
    }

    /// Whole minutes, censored at [`UNREACHABLE`]
    pub fn minutes(self) -> Minutes {
        match self {
            TravelTime::Reachable(seconds) => seconds_to_minutes(seconds),
            TravelTime::Unreachable => UNREACHABLE,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, TravelTime::Reachable(_))
    }
}

/// Floors seconds to minutes; anything at or beyond 255 minutes is unreachable
#[inline]
pub fn seconds_to_minutes(seconds: u32) -> Minutes {
    Minutes::try_from(seconds / 60).unwrap_or(UNREACHABLE)
}

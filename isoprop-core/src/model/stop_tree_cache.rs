//! Cache of the transit stops reachable on foot from every query pixel

use log::debug;

use crate::loading::codec::{DeltaDecoder, read_i32_stream};
use crate::{Error, StopId};

/// Per pixel (row-major over the query): a stop count followed by that many
/// `(stop, access time in seconds)` pairs.
#[derive(Debug, Clone)]
pub struct StopTreeCache {
    data: Vec<i32>,
    index: Vec<usize>,
    max_stop: Option<StopId>,
}

/// A stop reachable from a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAccess {
    pub stop: StopId,
    /// Walking time from the stop to the pixel, in seconds
    pub access_time: u32,
}

impl StopTreeCache {
    /// De-delta-codes `data` in place and builds the pixel index.
    ///
    /// Stop ids and access times are delta-coded continuously across the
    /// whole cache; the running sums are not reset between pixels.
    pub fn create(mut data: Vec<i32>, pixel_count: usize) -> Result<Self, Error> {
        let mut index = Vec::with_capacity(pixel_count);
        let mut stop_acc = DeltaDecoder::default();
        let mut time_acc = DeltaDecoder::default();
        let mut max_stop = None;

        let mut i = 0;
        while i < data.len() {
            if index.len() == pixel_count {
                return Err(Error::CorruptData(format!(
                    "stop tree cache holds more than the expected {pixel_count} pixels"
                )));
            }
            index.push(i);

            let n_stops = usize::try_from(data[i]).map_err(|_| {
                Error::CorruptData(format!(
                    "negative stop count {} for pixel {}",
                    data[i],
                    index.len() - 1
                ))
            })?;
            i += 1;

            let end = n_stops
                .checked_mul(2)
                .and_then(|n| n.checked_add(i))
                .filter(|&end| end <= data.len())
                .ok_or_else(|| {
                    Error::CorruptData("attempted to read past end of stop tree cache".to_string())
                })?;

            while i < end {
                let stop = stop_acc.next(data[i]);
                let time = time_acc.next(data[i + 1]);
                if stop < 0 || time < 0 {
                    return Err(Error::CorruptData(format!(
                        "stop tree cache decodes to stop {stop} with access time {time} at offset {i}"
                    )));
                }
                data[i] = stop;
                data[i + 1] = time;
                max_stop = max_stop.max(Some(stop.unsigned_abs() as StopId));
                i += 2;
            }
        }

        if index.len() != pixel_count {
            return Err(Error::CorruptData(format!(
                "expected to read {pixel_count} pixels but read only {}",
                index.len()
            )));
        }

        debug!(
            "Decoded stop tree cache: {pixel_count} pixels, {} ints",
            data.len()
        );

        Ok(Self {
            data,
            index,
            max_stop,
        })
    }

    pub fn from_bytes(bytes: &[u8], pixel_count: usize) -> Result<Self, Error> {
        Self::create(read_i32_stream(bytes)?, pixel_count)
    }

    pub fn pixel_count(&self) -> usize {
        self.index.len()
    }

    /// Highest stop id referenced by any pixel
    pub fn max_stop(&self) -> Option<StopId> {
        self.max_stop
    }

    /// Stops reachable from the pixel at row-major index `pixel`.
    /// Pixels outside the cache have no stops.
    pub fn reachable_stops(&self, pixel: usize) -> impl Iterator<Item = StopAccess> + '_ {
        let pairs = self.index.get(pixel).map_or(&[][..], |&offset| {
            // counts and bounds were validated in `create`
            let n_stops = self.data[offset] as usize;
            &self.data[offset + 1..offset + 1 + n_stops * 2]
        });

        pairs.chunks_exact(2).map(|pair| StopAccess {
            stop: pair[0] as StopId,
            access_time: pair[1].unsigned_abs(),
        })
    }
}

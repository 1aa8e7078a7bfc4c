//! Little-endian integer streams and the delta coding shared by every binary
//! payload the routing backend writes.

use crate::Error;

/// Reinterprets a byte buffer as little-endian `i32`s
pub fn read_i32_stream(bytes: &[u8]) -> Result<Vec<i32>, Error> {
    if bytes.len() % 4 != 0 {
        return Err(Error::CorruptData(format!(
            "expected a whole number of 32-bit integers, got {} bytes",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Serializes `i32`s as a little-endian byte stream
pub fn write_i32_stream(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// De-delta-codes `values` in place: `a[i] = a[i - 1] + a[i]`
pub fn delta_decode(values: &mut [i32]) {
    let mut acc = DeltaDecoder::default();
    for value in values.iter_mut() {
        *value = acc.next(*value);
    }
}

/// Inverse of [`delta_decode`]
pub fn delta_encode(values: &[i32]) -> Vec<i32> {
    let mut prev = 0i32;
    values
        .iter()
        .map(|&value| {
            let delta = value.wrapping_sub(prev);
            prev = value;
            delta
        })
        .collect()
}

/// Running sum over a delta-coded sequence.
///
/// Sums wrap like the 32-bit arrays the encoder works with.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DeltaDecoder {
    acc: i32,
}

impl DeltaDecoder {
    #[inline]
    pub(crate) fn next(&mut self, delta: i32) -> i32 {
        self.acc = self.acc.wrapping_add(delta);
        self.acc
    }
}

/// Forward-only reader over a decoded int stream.
///
/// Every read is bounds-checked; running past the end means the payload was
/// truncated or mis-sized and is reported as [`Error::CorruptData`].
#[derive(Debug)]
pub(crate) struct IntCursor<'a> {
    data: &'a [i32],
    pos: usize,
    what: &'static str,
}

impl<'a> IntCursor<'a> {
    pub(crate) fn new(data: &'a [i32], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn read(&mut self) -> Result<i32, Error> {
        let value = self.data.get(self.pos).copied().ok_or_else(|| {
            Error::CorruptData(format!(
                "attempted to read past end of {} at offset {}",
                self.what, self.pos
            ))
        })?;
        self.pos += 1;
        Ok(value)
    }

    /// Reads a value that must be a non-negative count or size
    pub(crate) fn read_count(&mut self, field: &str) -> Result<usize, Error> {
        let offset = self.pos;
        let value = self.read()?;
        usize::try_from(value).map_err(|_| {
            Error::CorruptData(format!(
                "negative {field} ({value}) in {} at offset {offset}",
                self.what
            ))
        })
    }

    /// Borrows the next `n` values and advances past them
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [i32], Error> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::CorruptData(format!(
                    "{} ends after {} values, needed {n} more from offset {}",
                    self.what,
                    self.data.len(),
                    self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Confirms the whole stream was consumed
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(Error::CorruptData(format!(
                "{} parse ended at offset {} but the payload holds {} values",
                self.what,
                self.pos,
                self.data.len()
            )))
        }
    }
}

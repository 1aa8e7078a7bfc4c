//! Opportunity grids (jobs, population, ...) rasterized in Web Mercator pixels

use std::sync::Arc;

use log::debug;

use super::extent::Extent;
use crate::Error;
use crate::loading::codec::{DeltaDecoder, read_i32_stream};

/// Size of `[zoom, west, north, width, height]`
const HEADER_INTS: usize = 5;
const HEADER_BYTES: usize = HEADER_INTS * 4;
/// Payloads are 8-byte aligned in the padded layouts
const PADDED_HEADER_BYTES: usize = 24;

/// Raster of opportunity counts with its own extent
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    extent: Extent,
    data: Vec<f64>,
}

impl Grid {
    /// Builds a grid from absolute (already decoded) values
    pub fn new(extent: Extent, data: Vec<f64>) -> Result<Self, Error> {
        if data.len() != extent.pixel_count() {
            return Err(Error::CorruptData(format!(
                "grid of {}x{} needs {} values, got {}",
                extent.width,
                extent.height,
                extent.pixel_count(),
                data.len()
            )));
        }
        Ok(Self { extent, data })
    }

    /// Parses a grid file.
    ///
    /// The header is five little-endian `i32`s. Values are delta-coded and
    /// stored either as `i32` right after the header, as `i32` after 4 bytes
    /// of padding, or as `f64` after 4 bytes of padding. The layout is
    /// recognised from the buffer length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_BYTES {
            return Err(Error::CorruptData(format!(
                "grid file of {} bytes is shorter than its header",
                bytes.len()
            )));
        }
        let header = read_i32_stream(&bytes[..HEADER_BYTES])?;
        let dimension = |value: i32, name: &str| {
            usize::try_from(value)
                .map_err(|_| Error::CorruptData(format!("negative grid {name} {value}")))
        };
        let extent = Extent {
            zoom: header[0],
            west: header[1],
            north: header[2],
            width: dimension(header[3], "width")?,
            height: dimension(header[4], "height")?,
        };

        let n = extent
            .width
            .checked_mul(extent.height)
            .ok_or_else(|| Error::CorruptData("grid dimensions overflow".to_string()))?;
        let len = bytes.len();

        let data = if Some(len) == n.checked_mul(4).map(|b| b + HEADER_BYTES) {
            decode_int_values(&bytes[HEADER_BYTES..])?
        } else if Some(len) == n.checked_mul(4).map(|b| b + PADDED_HEADER_BYTES) {
            decode_int_values(&bytes[PADDED_HEADER_BYTES..])?
        } else if Some(len) == n.checked_mul(8).map(|b| b + PADDED_HEADER_BYTES) {
            decode_float_values(&bytes[PADDED_HEADER_BYTES..])
        } else {
            return Err(Error::CorruptData(format!(
                "grid of {}x{} cannot be stored in {len} bytes",
                extent.width, extent.height
            )));
        };

        debug!(
            "Decoded {}x{} grid at zoom {} ({}, {})",
            extent.width, extent.height, extent.zoom, extent.west, extent.north
        );

        Self::new(extent, data)
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.extent.contains(x, y)
    }

    /// Value at grid-local coordinates, zero outside the grid
    pub fn value(&self, x: i64, y: i64) -> f64 {
        self.extent
            .pixel_index(x, y)
            .map_or(0.0, |index| self.data[index])
    }

    /// Value under a pixel of `query`, zero where the grid does not reach
    pub fn value_at_query_pixel(&self, query: &Extent, x: i64, y: i64) -> f64 {
        let (gx, gy) = self.extent.translate_from(query, x, y);
        self.value(gx, gy)
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

fn decode_int_values(bytes: &[u8]) -> Result<Vec<f64>, Error> {
    let mut acc = DeltaDecoder::default();
    Ok(read_i32_stream(bytes)?
        .into_iter()
        .map(|delta| f64::from(acc.next(delta)))
        .collect())
}

fn decode_float_values(bytes: &[u8]) -> Vec<f64> {
    let mut acc = 0.0;
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            acc += f64::from_le_bytes(raw);
            acc
        })
        .collect()
}

/// Named grids sharing one extent.
///
/// Mismatched extents are rejected when a grid is registered instead of
/// surfacing later as wrong accessibility figures.
#[derive(Debug, Clone, Default)]
pub struct GridSet {
    grids: Vec<(String, Arc<Grid>)>,
}

impl GridSet {
    /// Returns a new set containing `grid` under `name`, replacing any grid
    /// already registered with that name
    pub fn with_grid(&self, name: impl Into<String>, grid: Arc<Grid>) -> Result<Self, Error> {
        let name = name.into();
        if let Some((first_name, first)) = self.grids.iter().find(|(n, _)| *n != name) {
            if first.extent() != grid.extent() {
                return Err(Error::Configuration(format!(
                    "grid '{name}' has extent {:?} but grid '{first_name}' has {:?}",
                    grid.extent(),
                    first.extent()
                )));
            }
        }

        let mut grids = self.grids.clone();
        match grids.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = grid,
            None => grids.push((name, grid)),
        }
        Ok(Self { grids })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Grid>> {
        self.grids.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Grid)> {
        self.grids.iter().map(|(n, g)| (n.as_str(), g.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|(n, _)| n.as_str())
    }

    /// Shared extent of all grids, if any is registered
    pub fn extent(&self) -> Option<&Extent> {
        self.grids.first().map(|(_, g)| g.extent())
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::codec::{delta_encode, write_i32_stream};

    fn header(extent: &Extent) -> Vec<i32> {
        vec![
            extent.zoom,
            extent.west,
            extent.north,
            extent.width as i32,
            extent.height as i32,
        ]
    }

    fn extent(west: i32) -> Extent {
        Extent {
            zoom: 10,
            west,
            north: 20,
            width: 3,
            height: 2,
        }
    }

    #[test]
    fn decodes_unpadded_int_grid() {
        let values = vec![1, 2, 4, 8, 16, 32];
        let mut ints = header(&extent(7));
        ints.extend(delta_encode(&values));
        let grid = Grid::from_bytes(&write_i32_stream(&ints)).unwrap();
        assert_eq!(grid.extent(), &extent(7));
        assert_eq!(grid.data(), &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]);
        assert_eq!(grid.value(2, 1), 32.0);
        assert_eq!(grid.value(3, 1), 0.0);
        assert_eq!(grid.total(), 63.0);
    }

    #[test]
    fn decodes_padded_layouts() {
        let values = [3, 1, 4, 1, 5, 9];

        let mut ints = header(&extent(0));
        ints.push(0);
        ints.extend(delta_encode(&values));
        let grid = Grid::from_bytes(&write_i32_stream(&ints)).unwrap();
        assert_eq!(grid.data(), &[3.0, 1.0, 4.0, 1.0, 5.0, 9.0]);

        let mut bytes = write_i32_stream(&header(&extent(0)));
        bytes.extend([0u8; 4]);
        let mut prev = 0.0;
        for v in [0.5, 1.5, 2.0, 0.25, 4.0, 8.0] {
            bytes.extend(f64::to_le_bytes(v - prev));
            prev = v;
        }
        let grid = Grid::from_bytes(&bytes).unwrap();
        assert_eq!(grid.data(), &[0.5, 1.5, 2.0, 0.25, 4.0, 8.0]);
    }

    #[test]
    fn rejects_mis_sized_grid() {
        let mut ints = header(&extent(0));
        ints.extend([1, 1, 1]);
        assert!(matches!(
            Grid::from_bytes(&write_i32_stream(&ints)),
            Err(Error::CorruptData(_))
        ));
        assert!(Grid::from_bytes(&[0u8; 8]).is_err());
    }

    #[test]
    fn query_translation_reads_offset_grid() {
        let grid = Grid::new(extent(10), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let query = Extent {
            zoom: 10,
            west: 11,
            north: 20,
            width: 5,
            height: 5,
        };
        assert_eq!(grid.value_at_query_pixel(&query, 0, 0), 2.0);
        assert_eq!(grid.value_at_query_pixel(&query, 1, 1), 6.0);
        assert_eq!(grid.value_at_query_pixel(&query, 2, 0), 0.0);
    }

    #[test]
    fn grid_set_rejects_mismatched_extents() {
        let jobs = Arc::new(Grid::new(extent(0), vec![0.0; 6]).unwrap());
        let workers = Arc::new(Grid::new(extent(0), vec![1.0; 6]).unwrap());
        let shifted = Arc::new(Grid::new(extent(1), vec![1.0; 6]).unwrap());

        let set = GridSet::default().with_grid("jobs", jobs).unwrap();
        let set = set.with_grid("workers", workers).unwrap();
        assert_eq!(set.len(), 2);
        assert!(matches!(
            set.with_grid("shifted", shifted.clone()),
            Err(Error::Configuration(_))
        ));

        // a lone grid may be replaced by one with a different extent
        let single = GridSet::default()
            .with_grid(
                "jobs",
                Arc::new(Grid::new(extent(0), vec![0.0; 6]).unwrap()),
            )
            .unwrap();
        let replaced = single.with_grid("jobs", shifted).unwrap();
        assert_eq!(replaced.extent(), Some(&extent(1)));
    }
}

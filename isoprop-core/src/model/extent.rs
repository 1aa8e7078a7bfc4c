use serde::{Deserialize, Serialize};

/// Rectangle in Web Mercator pixel space at a zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub zoom: i32,
    pub west: i32,
    pub north: i32,
    pub width: usize,
    pub height: usize,
}

impl Extent {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Whether local coordinates fall inside this extent
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Row-major index of local coordinates, if inside
    pub fn pixel_index(&self, x: i64, y: i64) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Translates local coordinates of `other` into this extent's local
    /// coordinates. Both extents must share a zoom level.
    pub fn translate_from(&self, other: &Extent, x: i64, y: i64) -> (i64, i64) {
        (
            x + i64::from(other.west) - i64::from(self.west),
            y + i64::from(other.north) - i64::from(self.north),
        )
    }
}

/// Pixel coordinates relative to the query's north-west corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(west: i32, north: i32, width: usize, height: usize) -> Extent {
        Extent {
            zoom: 9,
            west,
            north,
            width,
            height,
        }
    }

    #[test]
    fn containment_and_index() {
        let e = extent(0, 0, 4, 3);
        assert_eq!(e.pixel_count(), 12);
        assert!(e.contains(0, 0));
        assert!(e.contains(3, 2));
        assert!(!e.contains(4, 0));
        assert!(!e.contains(0, -1));
        assert_eq!(e.pixel_index(1, 2), Some(9));
        assert_eq!(e.pixel_index(-1, 2), None);
    }

    #[test]
    fn translation_between_offset_extents() {
        let grid = extent(100, 200, 50, 50);
        let query = extent(110, 190, 10, 10);
        assert_eq!(grid.translate_from(&query, 0, 0), (10, -10));
        assert_eq!(grid.translate_from(&query, 5, 15), (15, 5));
    }
}

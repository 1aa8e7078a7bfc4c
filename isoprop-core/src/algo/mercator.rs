//! Web Mercator conversions for 256-pixel tiles

use std::f64::consts::PI;

use geo::Point;

const TILE_SIZE: f64 = 256.0;

/// Width of the world in pixels at `zoom`
fn world_size(zoom: i32) -> f64 {
    TILE_SIZE * 2f64.powi(zoom)
}

pub fn pixel_to_lon(x: f64, zoom: i32) -> f64 {
    x / world_size(zoom) * 360.0 - 180.0
}

pub fn pixel_to_lat(y: f64, zoom: i32) -> f64 {
    let n = PI - 2.0 * PI * y / world_size(zoom);
    n.sinh().atan().to_degrees()
}

pub fn lon_to_pixel(lon: f64, zoom: i32) -> f64 {
    (lon + 180.0) / 360.0 * world_size(zoom)
}

pub fn lat_to_pixel(lat: f64, zoom: i32) -> f64 {
    let lat = lat.to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world_size(zoom)
}

/// Geographic position (`x` = longitude, `y` = latitude) of an absolute pixel
pub fn pixel_to_point(x: f64, y: f64, zoom: i32) -> Point<f64> {
    Point::new(pixel_to_lon(x, zoom), pixel_to_lat(y, zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn world_corners() {
        assert!(close(pixel_to_lon(0.0, 0), -180.0));
        assert!(close(pixel_to_lon(256.0, 0), 180.0));
        assert!(close(pixel_to_lat(128.0, 0), 0.0));
        assert!(close(lon_to_pixel(0.0, 1), 256.0));
        assert!(close(lat_to_pixel(0.0, 3), 1024.0));
    }

    #[test]
    fn conversions_invert_each_other() {
        let zoom = 9;
        let (lon, lat) = (-77.0365, 38.8977);
        let x = lon_to_pixel(lon, zoom);
        let y = lat_to_pixel(lat, zoom);
        assert!(close(pixel_to_lon(x, zoom), lon));
        assert!(close(pixel_to_lat(y, zoom), lat));

        let point = pixel_to_point(x, y, zoom);
        assert!(close(point.x(), lon));
        assert!(close(point.y(), lat));
    }
}

//! Great-circle distance.

use crate::types::LatLng;

/// Sphere radius used for distances, matching the Maps geometry library.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Haversine distance between two points in meters.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = LatLng::new(21.95, 89.18);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        // 2 * pi * R / 360
        assert!((d - 111_319.49).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_symmetric_and_antipodal() {
        let a = LatLng::new(22.5, 88.3);
        let b = LatLng::new(-33.9, 151.2);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);

        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(0.0, 180.0));
        assert!((d - half_circumference).abs() < 1.0);
    }
}

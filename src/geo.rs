//! Great-circle distance between alert locations.

use crate::model::Coordinates;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius of the "near me" alert filter, in kilometres.
pub const ALERT_RADIUS_KM: f64 = 5.0;

/// Haversine distance in kilometres between two points in decimal degrees.
///
/// Symmetric and zero for identical points. Poles and antipodes get no
/// special handling; alert distances are intra-city or regional.
/// NaN inputs yield NaN.
pub fn haversine_distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `point` lies within `radius_km` of `center`, boundary included.
pub fn is_within_km(center: Coordinates, point: Coordinates, radius_km: f64) -> bool {
    haversine_distance_km(center, point) <= radius_km
}

/// The point `km` kilometres due north of `origin`.
///
/// Moving along a meridian changes only the latitude, so the haversine
/// distance back to `origin` is exactly `km` up to rounding.
#[cfg(test)]
pub(crate) fn offset_north_km(origin: Coordinates, km: f64) -> Coordinates {
    Coordinates::new(origin.latitude + (km / EARTH_RADIUS_KM).to_degrees(), origin.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAO_PAULO: Coordinates = Coordinates {
        latitude: -23.5505,
        longitude: -46.6333,
    };
    const RIO: Coordinates = Coordinates {
        latitude: -22.9068,
        longitude: -43.1729,
    };

    #[test]
    fn test_distance_identity() {
        assert_eq!(haversine_distance_km(SAO_PAULO, SAO_PAULO), 0.0);
        assert_eq!(haversine_distance_km(RIO, RIO), 0.0);
    }

    #[test]
    fn test_distance_symmetry() {
        let points = [
            SAO_PAULO,
            RIO,
            Coordinates::new(0.0, 0.0),
            Coordinates::new(51.5074, -0.1278),
            Coordinates::new(-33.8688, 151.2093),
        ];

        for a in points {
            for b in points {
                let ab = haversine_distance_km(a, b);
                let ba = haversine_distance_km(b, a);
                assert!((ab - ba).abs() < 1e-9, "{a:?} / {b:?}: {ab} != {ba}");
            }
        }
    }

    #[test]
    fn test_known_distance() {
        // Sao Paulo to Rio de Janeiro is roughly 360 km in a straight line.
        let d = haversine_distance_km(SAO_PAULO, RIO);
        assert!((350.0..370.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_monotonic_along_meridian() {
        let origin = Coordinates::new(-19.9167, -43.9345);
        let mut previous = 0.0;
        for km in [0.5, 1.0, 2.0, 4.0, 8.0, 16.0] {
            let d = haversine_distance_km(origin, offset_north_km(origin, km));
            assert!(d > previous);
            previous = d;
        }
    }

    #[test]
    fn test_offset_north_round_trips_distance() {
        let d = haversine_distance_km(SAO_PAULO, offset_north_km(SAO_PAULO, 2.0));
        assert!((d - 2.0).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let origin = Coordinates::new(0.0, 0.0);
        assert!(is_within_km(origin, offset_north_km(origin, 4.999), ALERT_RADIUS_KM));
        assert!(!is_within_km(origin, offset_north_km(origin, 5.001), ALERT_RADIUS_KM));

        // A point whose distance is computed as the radius itself passes.
        let edge = offset_north_km(origin, ALERT_RADIUS_KM);
        let d = haversine_distance_km(origin, edge);
        assert!(is_within_km(origin, edge, d));
    }

    #[test]
    fn test_nan_distance_fails_radius_check() {
        let bad = Coordinates::new(f64::NAN, 0.0);
        assert!(haversine_distance_km(SAO_PAULO, bad).is_nan());
        assert!(!is_within_km(SAO_PAULO, bad, ALERT_RADIUS_KM));
    }
}

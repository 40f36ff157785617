//! Great-circle matching of points against danger zones.
//!
//! Distances use the haversine formula over a spherical Earth; geodesic
//! precision beyond that approximation is out of scope.

use super::zone::Zone;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in metres between two points given in
/// decimal degrees.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether a point falls within a zone's radius. The boundary is inclusive:
/// a point exactly `radius_m` metres from the centre is a hit.
pub fn point_in_zone(latitude: f64, longitude: f64, zone: &Zone) -> bool {
    haversine_distance_m(latitude, longitude, zone.latitude, zone.longitude) <= zone.radius_m
}

/// Filter zones to those containing the point, preserving input order.
pub fn matching_zones(latitude: f64, longitude: f64, zones: &[Zone]) -> Vec<Zone> {
    zones
        .iter()
        .filter(|zone| point_in_zone(latitude, longitude, zone))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn zone(id: i32, latitude: f64, longitude: f64, radius_m: f64) -> Zone {
        Zone {
            id,
            name: format!("zone-{id}"),
            descr: String::new(),
            latitude,
            longitude,
            radius_m,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_distance_m(55.75, 37.62, 55.75, 37.62), 0.0);
    }

    #[rstest]
    #[case(55.75, 37.62, 55.7558, 37.6173)]
    #[case(-33.8688, 151.2093, 51.5074, -0.1278)]
    #[case(0.0, 179.9, 0.0, -179.9)]
    fn distance_is_symmetric(
        #[case] lat1: f64,
        #[case] lng1: f64,
        #[case] lat2: f64,
        #[case] lng2: f64,
    ) {
        let forward = haversine_distance_m(lat1, lng1, lat2, lng2);
        let backward = haversine_distance_m(lat2, lng2, lat1, lng1);
        assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn one_kilometre_north_measures_one_kilometre() {
        // 1000 m along a meridian corresponds to 1000 / R radians of latitude.
        let d_lat = (1000.0 / EARTH_RADIUS_M).to_degrees();
        let distance = haversine_distance_m(55.75, 37.62, 55.75 + d_lat, 37.62);
        assert!(
            (distance - 1000.0).abs() < 0.01,
            "expected ~1000 m, got {distance}"
        );
    }

    #[test]
    fn point_exactly_on_boundary_is_a_hit() {
        let d_lat = (1000.0 / EARTH_RADIUS_M).to_degrees();
        let distance = haversine_distance_m(55.75, 37.62, 55.75 + d_lat, 37.62);

        // Use the measured distance as the radius so the comparison exercises
        // the inclusive boundary without floating-point slack.
        let boundary_zone = zone(1, 55.75, 37.62, distance);
        assert!(point_in_zone(55.75 + d_lat, 37.62, &boundary_zone));
    }

    #[test]
    fn centre_point_hits_one_metre_zone() {
        let tiny = zone(1, 55.75, 37.62, 1.0);
        assert!(point_in_zone(55.75, 37.62, &tiny));
    }

    #[test]
    fn point_outside_radius_is_a_miss() {
        // ~1112 m east at this latitude, against a 1000 m radius.
        let wide = zone(1, 55.75, 37.62, 1000.0);
        assert!(!point_in_zone(55.75, 37.6377, &wide));
    }

    #[test]
    fn matching_preserves_zone_order() {
        let zones = vec![
            zone(3, 55.75, 37.62, 5000.0),
            zone(1, 10.0, 10.0, 100.0),
            zone(2, 55.7505, 37.6205, 2000.0),
        ];

        let matches = matching_zones(55.7505, 37.6205, &zones);
        let ids: Vec<i32> = matches.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn no_zones_means_no_matches() {
        assert!(matching_zones(55.75, 37.62, &[]).is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeofenceResult {
    pub allowed: bool,
    pub distance_km: f64,
}

/// Great-circle distance between two points (haversine formula).
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos() * to.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check-in geofence around the restaurant's reference point. Clients
/// report their own coordinates; the check is advisory, not a security
/// boundary.
#[derive(Debug, Clone)]
pub struct GeoService {
    reference: Coordinates,
    radius_km: f64,
}

impl GeoService {
    pub fn new(reference: Coordinates, radius_km: f64) -> Self {
        Self {
            reference,
            radius_km,
        }
    }

    pub fn check(&self, position: Coordinates) -> GeofenceResult {
        let distance_km = haversine_km(position, self.reference);
        GeofenceResult {
            allowed: distance_km < self.radius_km,
            distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTAURANT: Coordinates = Coordinates {
        latitude: 50.831_742,
        longitude: 19.082_614,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_km(RESTAURANT, RESTAURANT) < 1e-9);
    }

    #[test]
    fn reference_point_is_allowed() {
        let service = GeoService::new(RESTAURANT, 0.1);
        let result = service.check(RESTAURANT);
        assert!(result.allowed);
    }

    #[test]
    fn nearby_point_is_allowed() {
        let service = GeoService::new(RESTAURANT, 0.1);
        // ~50 m north of the reference point
        let close = Coordinates {
            latitude: RESTAURANT.latitude + 0.00045,
            longitude: RESTAURANT.longitude,
        };
        let result = service.check(close);
        assert!(result.allowed, "distance was {} km", result.distance_km);
    }

    #[test]
    fn distant_point_is_rejected() {
        let service = GeoService::new(RESTAURANT, 0.1);
        // Another city entirely
        let far = Coordinates {
            latitude: 52.229_7,
            longitude: 21.012_2,
        };
        let result = service.check(far);
        assert!(!result.allowed);
        assert!(result.distance_km > 100.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Paris -> London is roughly 344 km
        let paris = Coordinates {
            latitude: 48.8566,
            longitude: 2.3522,
        };
        let london = Coordinates {
            latitude: 51.5074,
            longitude: -0.1278,
        };
        let d = haversine_km(paris, london);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }
}

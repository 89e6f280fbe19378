use crate::models::{Location, Restaurant};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Location, b: Location) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Restaurants whose distance from `origin` is at most `radius_km`. Full scan.
pub fn within_radius(
    origin: Location,
    restaurants: Vec<Restaurant>,
    radius_km: f64,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| haversine_km(origin, r.location()) <= radius_km)
        .collect()
}

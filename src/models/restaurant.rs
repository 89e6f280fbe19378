use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_count: Option<i64>,
    #[serde(default)]
    pub opening_hours: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub price_level: Option<i64>,
    pub business_status: Option<String>,
    pub google_maps_url: Option<String>,
}

impl Restaurant {
    pub fn location(&self) -> Location {
        Location::new(self.lat, self.lng)
    }
}

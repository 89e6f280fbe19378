use serde::{Deserialize, Serialize};

pub use menu_item::{MenuItem, Recommendation};
pub use restaurant::{Location, Restaurant};
pub use seed::{SeedMenuItem, SeedRestaurant, SeedReview};

mod menu_item;
mod restaurant;
mod seed;

/// Location as sent by clients; either coordinate may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Request structure for dish recommendations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text description of what the user wants, e.g. "spicy vegetarian"
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: Option<LocationInput>,
}

/// Diagnostic counters reported alongside rule-based recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionStats {
    pub restaurants_nearby: usize,
    pub items_checked: usize,
    pub items_matched: usize,
    pub restaurants_matched: usize,
}

/// Response structure for dish recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<SelectionStats>,
}

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
}

use super::Restaurant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    pub calories: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A menu item paired with the restaurant that serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: MenuItem,
    pub restaurant: Restaurant,
}

impl Recommendation {
    pub fn restaurant_id(&self) -> i64 {
        self.restaurant.id
    }
}

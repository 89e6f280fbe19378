//! JSON formats shared by the offline data tools.
//!
//! Seed files come from scraping and LLM enrichment, so every numeric field
//! tolerates strings, nulls and garbage instead of failing the whole file.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
        Other(serde_json::Value),
    }

    Ok(match Option::<StringOrFloat>::deserialize(deserializer)? {
        Some(StringOrFloat::Float(f)) => Some(f),
        Some(StringOrFloat::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            f64::from_str(&cleaned).ok()
        }
        Some(StringOrFloat::Other(_)) | None => None,
    })
}

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_f64(deserializer)?.map(|value| value.round() as i64))
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<serde_json::Value>),
        Other(serde_json::Value),
    }

    Ok(match Option::<StringOrVec>::deserialize(deserializer)? {
        Some(StringOrVec::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Some(StringOrVec::Vec(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(StringOrVec::Other(_)) | None => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub calories: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedReview {
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRestaurant {
    pub name: String,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub user_ratings_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub opening_hours: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub price_level: Option<i64>,
    pub website: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: Option<String>,
    pub business_status: Option<String>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub menu_items: Vec<SeedMenuItem>,
}

impl SeedRestaurant {
    /// Drop menu items whose trimmed, lower-cased name was already seen.
    /// The first occurrence wins. Returns how many items were removed.
    pub fn dedupe_menu(&mut self) -> usize {
        let before = self.menu_items.len();
        let mut seen = HashSet::new();
        self.menu_items
            .retain(|item| seen.insert(item.name.trim().to_lowercase()));
        before - self.menu_items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_numbers_and_tags() {
        let item: SeedMenuItem = serde_json::from_value(json!({
            "name": "Mango Lassi",
            "price": "$4.50",
            "calories": "220",
            "tags": "Drink, Vegetarian"
        }))
        .unwrap();

        assert_eq!(item.price, Some(4.5));
        assert_eq!(item.calories, Some(220));
        assert_eq!(item.tags, vec!["Drink", "Vegetarian"]);
        assert!(item.description.is_none());
    }

    #[test]
    fn test_garbage_fields_become_empty() {
        let item: SeedMenuItem = serde_json::from_value(json!({
            "name": "Mystery Plate",
            "price": {"amount": 3},
            "calories": null,
            "tags": 17
        }))
        .unwrap();

        assert_eq!(item.price, None);
        assert_eq!(item.calories, None);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_restaurant_phone_alias_and_defaults() {
        let restaurant: SeedRestaurant = serde_json::from_value(json!({
            "name": "Tech Square Tandoor",
            "phone": "(404) 555-0100",
            "lat": 33.777,
            "lng": "-84.389"
        }))
        .unwrap();

        assert_eq!(restaurant.phone_number.as_deref(), Some("(404) 555-0100"));
        assert_eq!(restaurant.lng, Some(-84.389));
        assert!(restaurant.menu_items.is_empty());
        assert!(restaurant.opening_hours.is_empty());
    }

    #[test]
    fn test_dedupe_menu_keeps_first_occurrence() {
        let mut restaurant: SeedRestaurant = serde_json::from_value(json!({
            "name": "Dupes",
            "menu_items": [
                {"name": "Chicken Tikka", "price": 12.0},
                {"name": "  chicken tikka ", "price": 99.0},
                {"name": "Mango Lassi"}
            ]
        }))
        .unwrap();

        let removed = restaurant.dedupe_menu();

        assert_eq!(removed, 1);
        assert_eq!(restaurant.menu_items.len(), 2);
        assert_eq!(restaurant.menu_items[0].price, Some(12.0));
        assert_eq!(restaurant.menu_items[1].name, "Mango Lassi");
    }
}

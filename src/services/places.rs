use crate::config::PlacesSettings;
use crate::error::{ApiError, Result};
use crate::models::{Location, SeedRestaurant, SeedReview};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DETAIL_FIELDS: &str = "name,formatted_address,geometry,rating,user_ratings_total,\
opening_hours,photos,types,price_level,website,formatted_phone_number,business_status,reviews,url";

const PHOTO_MAX_WIDTH: u32 = 400;

/// Google Places client used to build the restaurant seed file.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
    radius_meters: u32,
    max_results: usize,
    page_delay: Duration,
}

impl PlacesClient {
    pub fn new(settings: &PlacesSettings, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            radius_meters: settings.radius_meters,
            max_results: settings.max_results,
            page_delay: Duration::from_secs(settings.page_delay_secs),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response: Value = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(message) = response["error_message"].as_str() {
            error!("Google Places API error: {}", message);
            return Err(ApiError::ExternalServiceError(format!(
                "Google Places API error: {}",
                message
            )));
        }
        Ok(response)
    }

    /// Restaurants around `center`, following result pages until `max_results` is reached.
    pub async fn nearby_restaurants(&self, center: Location) -> Result<Vec<SeedRestaurant>> {
        let location = format!("{},{}", center.lat, center.lng);
        let radius = self.radius_meters.to_string();
        let mut restaurants = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", "restaurant"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pagetoken", token));
            }

            let page = self
                .get_json("/maps/api/place/nearbysearch/json", &params)
                .await?;
            let results = page["results"].as_array().cloned().unwrap_or_default();
            debug!("Nearby search page returned {} places", results.len());

            for place_id in results.iter().filter_map(|r| r["place_id"].as_str()) {
                match self.place_details(place_id).await {
                    Ok(Some(details)) => {
                        info!("Fetched {}", details.name);
                        restaurants.push(details);
                    }
                    Ok(None) => warn!("No details for place {}", place_id),
                    Err(e) => warn!("Failed to fetch place {}: {}", place_id, e),
                }
            }

            page_token = page["next_page_token"].as_str().map(String::from);
            if page_token.is_none() || restaurants.len() >= self.max_results {
                break;
            }
            // Page tokens only become valid after a short delay.
            tokio::time::sleep(self.page_delay).await;
        }

        restaurants.truncate(self.max_results);
        Ok(restaurants)
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Option<SeedRestaurant>> {
        let response = self
            .get_json(
                "/maps/api/place/details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
            )
            .await?;
        Ok(self.parse_place_details(&response["result"]))
    }

    /// Map a details `result` object onto the seed format. Empty results yield `None`.
    pub fn parse_place_details(&self, result: &Value) -> Option<SeedRestaurant> {
        let name = result["name"].as_str()?.to_string();

        let photos = result["photos"]
            .as_array()
            .map(|photos| {
                photos
                    .iter()
                    .filter_map(|p| p["photo_reference"].as_str())
                    .map(|reference| {
                        format!(
                            "{}/maps/api/place/photo?maxwidth={}&photoreference={}&key={}",
                            self.base_url, PHOTO_MAX_WIDTH, reference, self.api_key
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let reviews = result["reviews"]
            .as_array()
            .map(|reviews| {
                reviews
                    .iter()
                    .map(|r| SeedReview {
                        author_name: r["author_name"].as_str().map(String::from),
                        rating: r["rating"].as_f64(),
                        text: r["text"].as_str().map(String::from),
                        time: r["relative_time_description"].as_str().map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(SeedRestaurant {
            name,
            address: result["formatted_address"].as_str().map(String::from),
            lat: result["geometry"]["location"]["lat"].as_f64(),
            lng: result["geometry"]["location"]["lng"].as_f64(),
            rating: result["rating"].as_f64(),
            user_ratings_count: result["user_ratings_total"].as_i64(),
            opening_hours: string_array(&result["opening_hours"]["weekday_text"]),
            photos,
            types: string_array(&result["types"]),
            price_level: result["price_level"].as_i64(),
            website: result["website"].as_str().map(String::from),
            phone_number: result["formatted_phone_number"].as_str().map(String::from),
            business_status: result["business_status"].as_str().map(String::from),
            reviews,
            google_maps_url: result["url"].as_str().map(String::from),
            menu_items: Vec::new(),
        })
    }
}

fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

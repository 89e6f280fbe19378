use anyhow::{Context, Result};
use log::{error, info};
use recommend_a_dish_api::{config::Config, models::Location, services::PlacesClient};
use std::{env, fs, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn fetch_restaurants(out_path: PathBuf) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let api_key = config
        .places_api_key()
        .context("APP_PLACES__API_KEY is not set")?;

    let center = Location::new(config.search.default_lat, config.search.default_lng);
    info!(
        "📍 Searching restaurants within {} m of ({}, {})",
        config.places.radius_meters, center.lat, center.lng
    );

    let client = PlacesClient::new(&config.places, api_key);
    let restaurants = client.nearby_restaurants(center).await?;
    info!("Found {} restaurants", restaurants.len());

    let json = serde_json::to_string_pretty(&restaurants)?;
    fs::write(&out_path, json)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    info!("💾 Saved restaurant data to {}", out_path.display());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_restaurants=info,recommend_a_dish_api=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .init();

    dotenv::dotenv().ok();

    let out_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/restaurant_list/restaurants_google_maps.json"));

    match fetch_restaurants(out_path).await {
        Ok(()) => {
            info!("✅ Restaurant fetch completed successfully!");
            Ok(())
        }
        Err(e) => {
            error!("❌ Restaurant fetch failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

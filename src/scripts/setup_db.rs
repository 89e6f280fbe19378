use anyhow::{Context, Result};
use log::{error, info, warn};
use recommend_a_dish_api::{config::Config, models::SeedRestaurant, services::RestaurantStore};
use std::{env, fs, path::Path};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn setup_db(seed_path: &Path) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let raw = fs::read_to_string(seed_path)
        .with_context(|| format!("Failed to read {}", seed_path.display()))?;
    let restaurants: Vec<SeedRestaurant> =
        serde_json::from_str(&raw).context("Seed file is not a list of restaurants")?;
    info!(
        "Loaded {} restaurants from {}",
        restaurants.len(),
        seed_path.display()
    );

    let store = RestaurantStore::connect(&config.database_url).await?;
    store.init_schema().await?;

    for restaurant in &restaurants {
        if restaurant.lat.is_none() || restaurant.lng.is_none() {
            warn!(
                "{} has no coordinates and will never be recommended",
                restaurant.name
            );
        }
        store
            .insert_restaurant(restaurant)
            .await
            .with_context(|| format!("Failed to insert {}", restaurant.name))?;
    }

    let (restaurant_count, item_count) = store.counts().await?;
    info!(
        "Store now holds {} restaurants and {} menu items",
        restaurant_count, item_count
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setup_db=info,recommend_a_dish_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    dotenv::dotenv().ok();

    let seed_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/restaurant_list/restaurants_google_maps.json".to_string());

    match setup_db(Path::new(&seed_path)).await {
        Ok(()) => {
            info!("✅ Database setup complete.");
            Ok(())
        }
        Err(e) => {
            error!("❌ Database setup failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

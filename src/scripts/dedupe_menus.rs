use anyhow::{Context, Result};
use log::{error, info};
use recommend_a_dish_api::models::SeedRestaurant;
use std::{env, fs, path::Path};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn dedupe_file(input: &Path, output: &Path) -> Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mut restaurants: Vec<SeedRestaurant> =
        serde_json::from_str(&raw).context("Input is not a list of restaurants")?;

    let mut removed = 0;
    for restaurant in &mut restaurants {
        let dropped = restaurant.dedupe_menu();
        if dropped > 0 {
            info!("{}: removed {} duplicate items", restaurant.name, dropped);
        }
        removed += dropped;
    }

    fs::write(output, serde_json::to_string_pretty(&restaurants)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Removed {} duplicates across {} restaurants",
        removed,
        restaurants.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dedupe_menus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args: Vec<String> = env::args().collect();
    let input = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("data/restaurant_list/restaurants_google_maps.json");
    let output = args
        .get(2)
        .map(String::as_str)
        .unwrap_or("data/restaurant_list/restaurants_google_maps_deduped.json");

    match dedupe_file(Path::new(input), Path::new(output)) {
        Ok(()) => {
            info!("✅ Deduplication complete. Output: {}", output);
            Ok(())
        }
        Err(e) => {
            error!("❌ Deduplication failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use recommend_a_dish_api::{
    config::Config,
    models::SeedMenuItem,
    services::{LlmClient, MenuEnricher},
};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn menu_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn enriched_path(out_dir: &Path, menu_file: &Path) -> PathBuf {
    let stem = menu_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{}_enriched.json", stem))
}

async fn enrich_menus(menus_dir: &Path, out_dir: &Path) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let api_key = config
        .llm_api_key()
        .context("APP_LLM__API_KEY is not set")?;
    let client = LlmClient::new(&config.llm, api_key, &config.llm.enrichment_model)?;
    let enricher = MenuEnricher::new(client, &config.llm);
    let pause = Duration::from_secs(config.llm.pause_between_items_secs);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for menu_file in menu_files(menus_dir)? {
        info!("📄 Processing {}", menu_file.display());
        let raw = fs::read_to_string(&menu_file)?;
        let items: Vec<SeedMenuItem> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Skipping {}: {}", menu_file.display(), e);
                continue;
            }
        };

        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .progress_chars("=> "),
        );

        let mut enriched = Vec::with_capacity(items.len());
        for item in &items {
            pb.set_message(item.name.clone());
            enriched.push(enricher.enrich_item(item).await);
            pb.inc(1);
            tokio::time::sleep(pause).await;
        }
        pb.finish_and_clear();

        let output = enriched_path(out_dir, &menu_file);
        fs::write(&output, serde_json::to_string_pretty(&enriched)?)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("💾 Enriched menu saved to {}", output.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enrich_menus=info,recommend_a_dish_api=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .init();

    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let menus_dir = PathBuf::from(args.get(1).map(String::as_str).unwrap_or("data/menus"));
    let out_dir = PathBuf::from(
        args.get(2)
            .map(String::as_str)
            .unwrap_or("data/enriched_menus"),
    );

    match enrich_menus(&menus_dir, &out_dir).await {
        Ok(()) => {
            info!("✅ Menu enrichment completed successfully!");
            Ok(())
        }
        Err(e) => {
            error!("❌ Menu enrichment failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

use crate::config::LlmSettings;
use crate::error::{ApiError, Result};
use crate::models::SeedMenuItem;
use crate::services::llm::LlmClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fills missing menu-item fields with a model's best guesses.
///
/// Rate limits are retried up to `max_attempts` times, sleeping for the delay the
/// provider suggests or `fallback_delay` when it gives none. Any other failure,
/// or running out of attempts, hands back the original item untouched.
#[derive(Debug, Clone)]
pub struct MenuEnricher {
    client: LlmClient,
    max_attempts: u32,
    fallback_delay: Duration,
}

impl MenuEnricher {
    pub fn new(client: LlmClient, settings: &LlmSettings) -> Self {
        Self {
            client,
            max_attempts: settings.max_attempts,
            fallback_delay: Duration::from_secs(settings.fallback_retry_delay_secs),
        }
    }

    pub fn build_prompt(item: &SeedMenuItem) -> Result<String> {
        Ok(format!(
            "Given the following menu item data, fill in any missing fields (description, \
             calories, etc.) with reasonable estimates. Keep fields that are already present. \
             If you don't know, make a best guess. Only use the fields name, description, \
             price, calories and tags, and drop any others. The tags must say which meat the \
             dish contains, or \"Vegetarian\" or \"Vegan\" if it is vegetarian or vegan. \
             Return a JSON object with all fields filled.\n\n\
             Menu item:\n\
             {{name: {}, description: {}, price: {}, calories: {}, tags: {}}}",
            serde_json::to_string(&item.name)?,
            serde_json::to_string(&item.description)?,
            serde_json::to_string(&item.price)?,
            serde_json::to_string(&item.calories)?,
            serde_json::to_string(&item.tags)?,
        ))
    }

    pub async fn enrich_item(&self, item: &SeedMenuItem) -> SeedMenuItem {
        let prompt = match Self::build_prompt(item) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Could not build prompt for '{}': {}", item.name, e);
                return item.clone();
            }
        };

        for attempt in 1..=self.max_attempts {
            match self.attempt(&prompt, item).await {
                Ok(enriched) => return enriched,
                Err(ApiError::RateLimited {
                    retry_after_secs, ..
                }) => {
                    let wait = retry_after_secs
                        .map(Duration::from_secs)
                        .unwrap_or(self.fallback_delay);
                    warn!(
                        "Rate limit hit (attempt {}/{}). Waiting {}s before retrying",
                        attempt,
                        self.max_attempts,
                        wait.as_secs()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    error!("Enrichment failed for '{}': {}", item.name, e);
                    return item.clone();
                }
            }
        }

        warn!(
            "Max retry attempts reached for '{}', keeping original item",
            item.name
        );
        item.clone()
    }

    async fn attempt(&self, prompt: &str, original: &SeedMenuItem) -> Result<SeedMenuItem> {
        let raw = self.client.generate_json(prompt).await?.ok_or_else(|| {
            ApiError::ExternalServiceError(format!("no usable answer for '{}'", original.name))
        })?;
        let mut value: Value = serde_json::from_str(raw.trim())?;

        if let Value::Object(map) = &mut value {
            map.entry("name")
                .or_insert_with(|| Value::String(original.name.clone()));
        }
        let enriched: SeedMenuItem = serde_json::from_value(value)?;
        info!("Enriched '{}'", enriched.name);
        Ok(enriched)
    }
}

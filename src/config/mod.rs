use crate::error::{ApiError, Result};
use serde::Deserialize;

pub const DEFAULT_LAT: f64 = 33.7770706;
pub const DEFAULT_LNG: f64 = -84.3902668;

/// Which ranking strategy the recommendation endpoint uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Rules,
    Llm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    pub radius_km: f64,
    pub max_results: usize,
    /// Reject requests without a location instead of falling back to the default coordinate.
    pub require_location: bool,
    pub default_lat: f64,
    pub default_lng: f64,
    pub include_debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub enrichment_model: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub fallback_retry_delay_secs: u64,
    pub pause_between_items_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub radius_meters: u32,
    pub max_results: usize,
    pub page_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub vocabulary_path: Option<String>,
    pub strategy: StrategyKind,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub places: PlacesSettings,
}

impl Config {
    /// Layer built-in defaults, an optional `config/default.toml`, and `APP_*` environment
    /// variables (nested keys separated by `__`, e.g. `APP_SEARCH__RADIUS_KM`).
    pub fn load() -> Result<Self> {
        let source = ::config::Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        Self::build(
            Self::defaults()?
                .add_source(::config::File::with_name("config/default").required(false))
                .add_source(source),
        )
    }

    fn defaults() -> Result<::config::ConfigBuilder<::config::builder::DefaultState>> {
        Ok(::config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000)?
            .set_default("database_url", "sqlite://restaurants.db")?
            .set_default("strategy", "rules")?
            .set_default("search.radius_km", 10.0)?
            .set_default("search.max_results", 10)?
            .set_default("search.require_location", true)?
            .set_default("search.default_lat", DEFAULT_LAT)?
            .set_default("search.default_lng", DEFAULT_LNG)?
            .set_default("search.include_debug", true)?
            .set_default("llm.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("llm.model", "gemini-2.5-pro")?
            .set_default("llm.enrichment_model", "gemini-2.0-flash-lite")?
            .set_default("llm.timeout_secs", 120)?
            .set_default("llm.max_attempts", 5)?
            .set_default("llm.fallback_retry_delay_secs", 60)?
            .set_default("llm.pause_between_items_secs", 3)?
            .set_default("places.base_url", "https://maps.googleapis.com")?
            .set_default("places.radius_meters", 1000)?
            .set_default("places.max_results", 60)?
            .set_default("places.page_delay_secs", 2)?)
    }

    fn build(builder: ::config::ConfigBuilder<::config::builder::DefaultState>) -> Result<Self> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.search.radius_km > 0.0) {
            return Err(ApiError::ConfigError(format!(
                "search.radius_km must be positive, got {}",
                self.search.radius_km
            )));
        }

        if self.search.max_results == 0 {
            return Err(ApiError::ConfigError(
                "search.max_results must be at least 1".to_string(),
            ));
        }

        if !(-90.0..=90.0).contains(&self.search.default_lat)
            || !(-180.0..=180.0).contains(&self.search.default_lng)
        {
            return Err(ApiError::ConfigError(format!(
                "default location ({}, {}) is not a valid coordinate",
                self.search.default_lat, self.search.default_lng
            )));
        }

        if self.strategy == StrategyKind::Llm && self.llm_api_key().is_none() {
            return Err(ApiError::ConfigError(
                "strategy = llm requires APP_LLM__API_KEY".to_string(),
            ));
        }

        Ok(())
    }

    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn places_api_key(&self) -> Option<&str> {
        self.places
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_with(overrides: &[(&str, &str)]) -> Result<Config> {
        let mut builder = Config::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        Config::build(builder)
    }

    #[test]
    fn test_defaults() {
        let config = defaults_with(&[]).unwrap();

        assert_eq!(config.strategy, StrategyKind::Rules);
        assert_eq!(config.search.radius_km, 10.0);
        assert_eq!(config.search.max_results, 10);
        assert!(config.search.require_location);
        assert_eq!(config.search.default_lat, DEFAULT_LAT);
        assert_eq!(config.llm.max_attempts, 5);
        assert!(config.vocabulary_path.is_none());
    }

    #[test]
    fn test_llm_strategy_requires_key() {
        let err = defaults_with(&[("strategy", "llm")]).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));

        let config = defaults_with(&[("strategy", "llm"), ("llm.api_key", "secret")]).unwrap();
        assert_eq!(config.strategy, StrategyKind::Llm);
        assert_eq!(config.llm_api_key(), Some("secret"));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let err = defaults_with(&[("search.radius_km", "0")]).unwrap_err();
        assert!(err.to_string().contains("radius_km"));
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = defaults_with(&[("places.api_key", "   ")]).unwrap();
        assert!(config.places_api_key().is_none());
    }
}

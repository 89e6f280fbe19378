use crate::config::{Config, SearchSettings, StrategyKind};
use crate::error::{ApiError, Result};
use crate::models::{
    Location, LocationInput, Recommendation, RecommendationRequest, RecommendationResponse,
    SelectionStats,
};
use crate::services::geo::within_radius;
use crate::services::llm::LlmClient;
use crate::services::llm_ranker::LlmRanker;
use crate::services::matcher::ItemMatcher;
use crate::services::requirements::QueryRequirement;
use crate::services::selector::select_diverse;
use crate::services::store::RestaurantStore;
use crate::services::vocabulary::Vocabulary;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Deterministic filtering followed by a random, restaurant-diverse pick.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    vocabulary: Arc<Vocabulary>,
    max_results: usize,
}

impl RuleEngine {
    pub fn new(vocabulary: Arc<Vocabulary>, max_results: usize) -> Self {
        Self {
            vocabulary,
            max_results,
        }
    }

    pub fn recommend<R: Rng + ?Sized>(
        &self,
        query: &str,
        candidates: Vec<Recommendation>,
        rng: &mut R,
    ) -> (Vec<Recommendation>, SelectionStats) {
        let requirement = QueryRequirement::parse(query, &self.vocabulary);
        info!(?requirement, "Parsed query requirements");

        let matcher = ItemMatcher::new(&self.vocabulary, &requirement);
        let items_checked = candidates.len();
        let matching: Vec<Recommendation> = candidates
            .into_iter()
            .filter(|candidate| match matcher.evaluate(&candidate.item) {
                Ok(()) => true,
                Err(reason) => {
                    trace!("Rejected '{}': {}", candidate.item.name, reason);
                    false
                }
            })
            .collect();

        let stats = SelectionStats {
            restaurants_nearby: 0,
            items_checked,
            items_matched: matching.len(),
            restaurants_matched: matching
                .iter()
                .map(Recommendation::restaurant_id)
                .collect::<HashSet<_>>()
                .len(),
        };

        (select_diverse(matching, self.max_results, rng), stats)
    }
}

/// How the final list is chosen from in-radius candidates.
#[derive(Debug, Clone)]
pub enum Strategy {
    Rules(RuleEngine),
    Llm(LlmRanker),
}

#[derive(Debug, Clone)]
pub struct RecommendationService {
    store: RestaurantStore,
    search: SearchSettings,
    strategy: Strategy,
}

impl RecommendationService {
    pub fn new(store: RestaurantStore, search: SearchSettings, strategy: Strategy) -> Self {
        Self {
            store,
            search,
            strategy,
        }
    }

    pub fn from_config(config: &Config, store: RestaurantStore) -> Result<Self> {
        let vocabulary = Vocabulary::load(config.vocabulary_path.as_deref().map(std::path::Path::new))?;
        let strategy = match config.strategy {
            StrategyKind::Rules => Strategy::Rules(RuleEngine::new(
                Arc::new(vocabulary),
                config.search.max_results,
            )),
            StrategyKind::Llm => {
                let api_key = config.llm_api_key().ok_or_else(|| {
                    ApiError::ConfigError("LLM strategy selected without an API key".to_string())
                })?;
                let client = LlmClient::new(&config.llm, api_key, &config.llm.model)?;
                Strategy::Llm(LlmRanker::new(client, config.search.max_results))
            }
        };
        info!("Recommendation strategy: {:?}", config.strategy);

        Ok(Self::new(store, config.search.clone(), strategy))
    }

    /// Strict mode demands both coordinates; permissive mode falls back to the default.
    pub fn resolve_location(&self, input: Option<&LocationInput>) -> Result<Location> {
        let coordinates = input.and_then(|loc| loc.lat.zip(loc.lng));

        let location = match coordinates {
            Some((lat, lng)) => Location::new(lat, lng),
            None if self.search.require_location => {
                return Err(ApiError::InvalidInput("Location required".to_string()));
            }
            None => {
                debug!("No location supplied, using default coordinate");
                Location::new(self.search.default_lat, self.search.default_lng)
            }
        };

        if !location.is_valid() {
            return Err(ApiError::InvalidInput(format!(
                "Location ({}, {}) is out of range",
                location.lat, location.lng
            )));
        }

        Ok(location)
    }

    /// Every menu item of every restaurant within the search radius.
    pub async fn nearby_candidates(&self, origin: Location) -> Result<(usize, Vec<Recommendation>)> {
        let restaurants = self.store.all_restaurants().await?;
        let nearby = within_radius(origin, restaurants, self.search.radius_km);
        info!(
            "{} restaurants within {} km of ({}, {})",
            nearby.len(),
            self.search.radius_km,
            origin.lat,
            origin.lng
        );

        let restaurants_nearby = nearby.len();
        let mut candidates = Vec::new();
        for restaurant in nearby {
            let items = match self.store.menu_items_for(restaurant.id).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Skipping menu of restaurant {}: {}", restaurant.id, e);
                    continue;
                }
            };
            candidates.extend(items.into_iter().map(|item| Recommendation {
                item,
                restaurant: restaurant.clone(),
            }));
        }

        Ok((restaurants_nearby, candidates))
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        let query = request.query.as_str();
        let origin = self.resolve_location(request.location.as_ref())?;
        let (restaurants_nearby, candidates) = self.nearby_candidates(origin).await?;

        match &self.strategy {
            Strategy::Rules(engine) => {
                let (selected, mut stats) = {
                    let mut rng = rand::thread_rng();
                    engine.recommend(query, candidates, &mut rng)
                };
                stats.restaurants_nearby = restaurants_nearby;
                info!(
                    "Checked {} items, {} matched across {} restaurants, returning {}",
                    stats.items_checked,
                    stats.items_matched,
                    stats.restaurants_matched,
                    selected.len()
                );

                let recommendations = selected
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(RecommendationResponse {
                    recommendations,
                    debug: self.search.include_debug.then_some(stats),
                })
            }
            Strategy::Llm(ranker) => Ok(RecommendationResponse {
                recommendations: ranker.rank(query, &candidates).await?,
                debug: None,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{DEFAULT_LAT, DEFAULT_LNG};
    use crate::services::llm::tests::{client_for, text_response, GENERATE_PATH};
    use crate::services::store::tests::{memory_store, seed};
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn search_settings(require_location: bool) -> SearchSettings {
        SearchSettings {
            radius_km: 10.0,
            max_results: 10,
            require_location,
            default_lat: DEFAULT_LAT,
            default_lng: DEFAULT_LNG,
            include_debug: true,
        }
    }

    fn rules() -> Strategy {
        Strategy::Rules(RuleEngine::new(Arc::new(Vocabulary::builtin()), 10))
    }

    /// Tandoor ~3 km north of Tech Square, Noodle Bar next door, Far Grill ~20 km west.
    pub(crate) async fn seeded_store() -> RestaurantStore {
        let store = memory_store().await;
        for restaurant in [
            seed(
                "Tandoor",
                DEFAULT_LAT + 0.027,
                DEFAULT_LNG,
                &[
                    ("Mango Lassi", "sweet yogurt drink", "Drink"),
                    ("Chicken Tikka", "charred chicken skewers", ""),
                    ("Spicy Paneer Tikka", "grilled paneer in chili sauce", ""),
                ],
            ),
            seed(
                "Noodle Bar",
                DEFAULT_LAT + 0.001,
                DEFAULT_LNG + 0.001,
                &[
                    ("Mapo Tofu", "silken tofu with sichuan chili", "Vegan"),
                    ("Tonkotsu Ramen", "rich pork broth", ""),
                ],
            ),
            seed(
                "Far Grill",
                DEFAULT_LAT,
                DEFAULT_LNG - 0.2,
                &[("Jalapeno Veggie Burger", "spicy black bean patty", "")],
            ),
        ] {
            store.insert_restaurant(&restaurant).await.unwrap();
        }
        store
    }

    fn tech_square() -> LocationInput {
        LocationInput {
            lat: Some(DEFAULT_LAT),
            lng: Some(DEFAULT_LNG),
        }
    }

    fn request_for(query: &str, location: Option<LocationInput>) -> RecommendationRequest {
        RecommendationRequest {
            query: query.to_string(),
            location,
        }
    }

    fn names(outcome: &RecommendationResponse) -> HashSet<String> {
        outcome
            .recommendations
            .iter()
            .filter_map(|r| r["name"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn test_rule_engine_stats_and_diversity() {
        let engine = RuleEngine::new(Arc::new(Vocabulary::builtin()), 10);
        let restaurant = crate::services::selector::tests::restaurant(1, 0.0, 0.0);
        let candidates: Vec<Recommendation> = ["Chili Noodles", "Chili Wontons", "Plain Rice"]
            .iter()
            .enumerate()
            .map(|(i, name)| Recommendation {
                item: crate::models::MenuItem {
                    id: i as i64,
                    restaurant_id: 1,
                    name: name.to_string(),
                    description: String::new(),
                    price: None,
                    calories: None,
                    tags: Vec::new(),
                },
                restaurant: restaurant.clone(),
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(1);
        let (selected, stats) = engine.recommend("spicy", candidates, &mut rng);

        assert_eq!(stats.items_checked, 3);
        assert_eq!(stats.items_matched, 2);
        assert_eq!(stats.restaurants_matched, 1);
        assert_eq!(selected.len(), 1);
        assert!(selected[0].item.name.starts_with("Chili"));
    }

    #[tokio::test]
    async fn test_strict_mode_requires_location() {
        let service = RecommendationService::new(memory_store().await, search_settings(true), rules());

        for input in [
            None,
            Some(LocationInput {
                lat: Some(DEFAULT_LAT),
                lng: None,
            }),
        ] {
            let err = service.recommend(&request_for("spicy", input)).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_permissive_mode_falls_back_to_default() {
        let service = RecommendationService::new(seeded_store().await, search_settings(false), rules());

        let outcome = service.recommend(&request_for("drink", None)).await.unwrap();

        assert_eq!(names(&outcome), HashSet::from(["Mango Lassi".to_string()]));
    }

    #[tokio::test]
    async fn test_out_of_range_location_rejected() {
        let service = RecommendationService::new(memory_store().await, search_settings(true), rules());
        let input = LocationInput {
            lat: Some(123.0),
            lng: Some(0.0),
        };

        let err = service.recommend(&request_for("", Some(input))).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_drink_query_within_radius() {
        let service = RecommendationService::new(seeded_store().await, search_settings(true), rules());

        let outcome = service.recommend(&request_for("drink", Some(tech_square()))).await.unwrap();

        assert_eq!(names(&outcome), HashSet::from(["Mango Lassi".to_string()]));
        let stats = outcome.debug.unwrap();
        assert_eq!(stats.restaurants_nearby, 2);
        assert_eq!(stats.items_checked, 5);
        assert_eq!(stats.items_matched, 1);
        assert_eq!(outcome.recommendations[0]["restaurant"]["name"], "Tandoor");
    }

    #[tokio::test]
    async fn test_spicy_vegetarian_one_per_restaurant() {
        let service = RecommendationService::new(seeded_store().await, search_settings(true), rules());

        let outcome = service
            .recommend(&request_for("spicy vegetarian", Some(tech_square())))
            .await
            .unwrap();

        // The far-away burger also qualifies but is outside the radius.
        assert_eq!(
            names(&outcome),
            HashSet::from(["Spicy Paneer Tikka".to_string(), "Mapo Tofu".to_string()])
        );
    }

    #[tokio::test]
    async fn test_empty_query_returns_one_food_item_per_restaurant() {
        let service = RecommendationService::new(seeded_store().await, search_settings(true), rules());

        let outcome = service.recommend(&request_for("", Some(tech_square()))).await.unwrap();

        assert_eq!(outcome.recommendations.len(), 2);
        let restaurants: HashSet<&str> = outcome
            .recommendations
            .iter()
            .filter_map(|r| r["restaurant"]["name"].as_str())
            .collect();
        assert_eq!(restaurants, HashSet::from(["Tandoor", "Noodle Bar"]));
        assert!(!names(&outcome).contains("Mango Lassi"));
        assert_eq!(outcome.debug.unwrap().items_matched, 4);
    }

    #[tokio::test]
    async fn test_debug_stats_can_be_disabled() {
        let mut search = search_settings(true);
        search.include_debug = false;
        let service = RecommendationService::new(seeded_store().await, search, rules());

        let outcome = service.recommend(&request_for("", Some(tech_square()))).await.unwrap();
        assert!(outcome.debug.is_none());
    }

    #[tokio::test]
    async fn test_llm_strategy_passes_model_picks_through() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", GENERATE_PATH)).respond_with(
                json_encoded(text_response(r#"[{"name": "Mapo Tofu", "restaurant": {"name": "Noodle Bar"}}]"#)),
            ),
        );
        let strategy = Strategy::Llm(LlmRanker::new(client_for(&server), 10));
        let service = RecommendationService::new(seeded_store().await, search_settings(true), strategy);

        let outcome = service.recommend(&request_for("tofu", Some(tech_square()))).await.unwrap();

        assert_eq!(names(&outcome), HashSet::from(["Mapo Tofu".to_string()]));
        assert!(outcome.debug.is_none());
    }
}

pub mod enrichment;
pub mod geo;
pub mod llm;
pub mod llm_ranker;
pub mod matcher;
pub mod places;
pub mod recommendation;
pub mod requirements;
pub mod selector;
pub mod store;
pub mod tag_expander;
pub mod vocabulary;

// Re-export public types
pub use enrichment::MenuEnricher;
pub use llm::LlmClient;
pub use llm_ranker::LlmRanker;
pub use places::PlacesClient;
pub use recommendation::{RecommendationService, RuleEngine, Strategy};
pub use store::RestaurantStore;
pub use vocabulary::Vocabulary;

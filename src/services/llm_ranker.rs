use crate::error::Result;
use crate::models::Recommendation;
use crate::services::llm::LlmClient;
use serde_json::Value;
use tracing::{info, warn};

/// Delegates dish selection to a hosted model.
#[derive(Debug, Clone)]
pub struct LlmRanker {
    client: LlmClient,
    max_results: usize,
}

impl LlmRanker {
    pub fn new(client: LlmClient, max_results: usize) -> Self {
        Self {
            client,
            max_results,
        }
    }

    pub fn build_prompt(&self, query: &str, candidates: &[Recommendation]) -> Result<String> {
        let menu = serde_json::to_string(candidates)?;
        Ok(format!(
            "You recommend dishes from nearby restaurants. Pick the {limit} menu items below \
             that best fit the user's request and leave out anything that does not fit. \
             For each pick return its name, description, tags and the full restaurant object \
             under \"restaurant\".\n\n\
             User request: {query}\n\n\
             Menu items: {menu}\n\n\
             When many dishes fit equally well, vary which ones you pick so repeat visitors see \
             something new. Answer with a JSON array of at most {limit} objects.",
            limit = self.max_results,
            query = query,
            menu = menu,
        ))
    }

    /// Transport failures propagate; an unreadable answer yields no recommendations.
    pub async fn rank(&self, query: &str, candidates: &[Recommendation]) -> Result<Vec<Value>> {
        let prompt = self.build_prompt(query, candidates)?;
        info!(
            "Asking {} to rank {} candidates",
            self.client.model(),
            candidates.len()
        );

        let raw = self.client.generate_json(&prompt).await?;
        match raw.as_deref().and_then(parse_recommendations) {
            Some(mut picks) => {
                picks.truncate(self.max_results);
                Ok(picks)
            }
            None => {
                warn!("Could not parse model response as a recommendation list");
                Ok(Vec::new())
            }
        }
    }
}

/// Accepts a bare JSON array, or an object wrapping one (e.g. `{"recommendations": [...]}`).
pub fn parse_recommendations(raw: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(raw.trim()).ok()? {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.into_iter().find_map(|(_, value)| match value {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}
